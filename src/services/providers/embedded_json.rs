/// Isolating and walking JSON blobs embedded in HTML documents.
///
/// Search result pages assign their initial data to a script variable. The page as a
/// whole is not JSON, so the object literal has to be cut out by brace matching
/// before it can be parsed.
use serde_json::Value;

/// Assignment markers tried in order when looking for the initial data blob
pub const INITIAL_DATA_MARKERS: &[&str] = &[
    "var ytInitialData =",
    "window[\"ytInitialData\"] =",
    "ytInitialData =",
];

/// Last-resort marker where the blob is a property of a larger object
pub const INITIAL_DATA_PROPERTY: &str = "\"ytInitialData\":";

/// Returns the balanced `{...}` object starting at the first `{` after `marker`,
/// together with the byte index one past its closing brace.
///
/// Braces inside string literals are ignored, honoring backslash escapes.
pub fn extract_balanced_object<'a>(source: &'a str, marker: &str) -> Option<(&'a str, usize)> {
    let marker_at = source.find(marker)?;
    let start = marker_at + source[marker_at..].find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    // All structural characters are ASCII, so byte positions are char boundaries
    for (offset, byte) in source.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + 1;
                    return Some((&source[start..end], end));
                }
            }
            _ => {}
        }
    }

    None
}

/// Extracts and parses the object after `marker`; `None` on any failure
pub fn parse_object_after(source: &str, marker: &str) -> Option<Value> {
    let (raw, _) = extract_balanced_object(source, marker)?;
    serde_json::from_str(raw).ok()
}

/// Locates the initial data document of a search results page
pub fn find_initial_data(html: &str) -> Option<Value> {
    if let Some(data) = INITIAL_DATA_MARKERS
        .iter()
        .find_map(|marker| parse_object_after(html, marker))
    {
        return Some(data);
    }

    let data = parse_object_after(html, INITIAL_DATA_PROPERTY)?;
    match data.get("ytInitialData") {
        Some(inner) => Some(inner.clone()),
        None => Some(data),
    }
}

/// Narrows a search document to the subtree holding the results
pub fn search_root(data: &Value) -> &Value {
    let renderer = data
        .get("contents")
        .and_then(|c| c.get("twoColumnSearchResultsRenderer"));

    renderer
        .and_then(|r| r.get("primaryContents"))
        .or(renderer)
        .unwrap_or(data)
}

/// Flattens the three text shapes used by the page into a plain string:
/// a bare string, `{"simpleText": ..}`, or `{"runs": [{"text": ..}, ..]}`.
pub fn text_of(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    if let Some(s) = value.as_str() {
        return s.to_string();
    }
    if let Some(s) = value.get("simpleText").and_then(Value::as_str) {
        return s.to_string();
    }
    if let Some(runs) = value.get("runs").and_then(Value::as_array) {
        return runs
            .iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect();
    }

    String::new()
}

/// First non-empty text among `keys` of `node`
pub fn first_text(node: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| text_of(node.get(*key)))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Depth-first search for objects carrying a child object under `key`.
///
/// Uses an explicit stack so pathological nesting cannot overflow the call stack.
/// Visits at most until `limit` nodes have been mapped to `Some`.
pub fn collect_nodes<T>(
    root: &Value,
    key: &str,
    limit: usize,
    mut map: impl FnMut(&Value) -> Option<T>,
) -> Vec<T> {
    let mut out = Vec::new();
    let mut stack = vec![root];

    while out.len() < limit {
        let Some(current) = stack.pop() else {
            break;
        };

        match current {
            Value::Object(fields) => {
                if let Some(node @ Value::Object(_)) = fields.get(key) {
                    if let Some(found) = map(node) {
                        out.push(found);
                    }
                }
                stack.extend(fields.values().filter(|v| is_container(v)));
            }
            Value::Array(values) => {
                stack.extend(values.iter().filter(|v| is_container(v)));
            }
            _ => {}
        }
    }

    out
}

fn is_container(value: &Value) -> bool {
    value.is_object() || value.is_array()
}
