//! Minimal `multipart/form-data` reader: finds one named part and its filename.

/// One uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// The `boundary` parameter of a `multipart/form-data` content type.
#[must_use]
pub fn boundary(content_type: &str) -> Option<&str> {
    let mut params = content_type.split(';').map(str::trim);
    let mime = params.next()?;
    if !mime.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    params
        .filter_map(|p| p.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|b| !b.is_empty())
}

/// Find the part whose `Content-Disposition` name is `field`.
#[must_use]
pub fn find_part(body: &[u8], boundary: &str, field: &str) -> Option<FilePart> {
    let delimiter = [b"--".as_slice(), boundary.as_bytes()].concat();
    let mut cursor = find(body, &delimiter, 0)? + delimiter.len();

    loop {
        let rest = &body[cursor..];
        if rest.starts_with(b"--") {
            return None;
        }
        let start = cursor + line_break_len(rest);
        let end = find(body, &delimiter, start)?;

        if let Some(part) = parse_part(&body[start..end], field) {
            return Some(part);
        }
        cursor = end + delimiter.len();
    }
}

fn parse_part(part: &[u8], field: &str) -> Option<FilePart> {
    let header_end = find(part, b"\r\n\r\n", 0)?;
    let headers = String::from_utf8_lossy(&part[..header_end]);
    let content = &part[header_end + 4..];
    let content = content.strip_suffix(b"\r\n").unwrap_or(content);

    let disposition = headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-disposition")
            .then(|| value.trim().to_string())
    })?;

    if disposition_param(&disposition, "name").as_deref() != Some(field) {
        return None;
    }

    Some(FilePart {
        filename: disposition_param(&disposition, "filename"),
        data: content.to_vec(),
    })
}

/// Value of `key` in `form-data; name="file"; filename="a.json"`.
fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .filter_map(|p| p.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
}

const fn line_break_len(rest: &[u8]) -> usize {
    match rest {
        [b'\r', b'\n', ..] => 2,
        [b'\n', ..] => 1,
        _ => 0,
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}
