use log::warn;

/// Ordered `KEY=VALUE` pairs from the text after a directive's colon.
///
/// Values are kept raw, quotes included. Use [`AttributeList::get_unquoted`]
/// for quoted-string attributes such as `URI` or `CODECS`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeList {
    pairs: Vec<(String, String)>,
}

impl AttributeList {
    /// Returns the raw value of the first attribute named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Self::get) with one pair of surrounding double quotes removed.
    pub fn get_unquoted(&self, key: &str) -> Option<&str> {
        self.get(key).map(unquote)
    }

    /// Number of attributes, duplicates included.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no `KEY=VALUE` pair was found.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in the order they appeared, values raw.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Splits `input` on commas that are not inside a double-quoted value.
fn split_fields(input: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, b) in input.bytes().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                fields.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&input[start..]);
    fields
}

/// Tokenizes an attribute list such as
/// `PROGRAM-ID=1,BANDWIDTH=2757000,CODECS="avc1.4d001f,mp4a.40.2"`.
///
/// Fragments without `=` are skipped with a diagnostic.
pub fn parse_attribute_list(input: &str) -> AttributeList {
    let mut list = AttributeList::default();

    for field in split_fields(input) {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        match field.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                list.pairs
                    .push((key.trim().to_string(), value.trim().to_string()));
            }
            _ => warn!("Skipping unparseable attribute {:?} in {:?}", field, input),
        }
    }

    list
}
