use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use locator_logging::locator_debug;
use url::Url;

const META_SNIFF_BYTES: usize = 1024;

/// Decode a page body to UTF-8.
///
/// Order: BOM, Content-Type charset, `<meta charset>` in the first kilobyte,
/// then chardetng with the url's top-level domain as a hint. Regional store
/// sites still serve Latin-1 often enough for the last step to matter.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>, url: &str) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| content_type.and_then(header_charset))
        .or_else(|| meta_charset(bytes))
        .unwrap_or_else(|| detect(bytes, url));

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        locator_debug!("{} is not clean {}; kept replacement characters", url, encoding.name());
    }
    text.into_owned()
}

fn header_charset(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(value.trim().trim_matches(&['"', '\''][..]).as_bytes())
    })
}

fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(&['"', '\''][..])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    Encoding::for_label(label.as_bytes())
}

fn detect(bytes: &[u8], url: &str) -> &'static Encoding {
    let host = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string));
    let tld = host
        .as_deref()
        .and_then(|h| h.rsplit('.').next())
        .map(str::as_bytes);
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(tld, true)
}
