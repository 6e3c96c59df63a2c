use regex::Regex;

lazy_static::lazy_static! {
    static ref INFO_HASH: Regex =
        Regex::new(r"xt=urn:btih:([0-9A-Fa-f]{40}|[0-9A-Za-z]{32})").unwrap();
    static ref SIZE_TOKEN: Regex = Regex::new(r"(?i)([0-9]*\.?[0-9]+)\s*([KMGT]i?B|B)\b").unwrap();
    static ref SEEDERS: Regex = Regex::new(r"(?i)Seeders:\s*([0-9]+)").unwrap();
    static ref LEECHERS: Regex = Regex::new(r"(?i)Leechers:\s*([0-9]+)").unwrap();
    static ref DOWNLOADS: Regex = Regex::new(r"(?i)Downloads:\s*([0-9]+)").unwrap();
}

/// Pulls the info-hash out of a magnet URI's exact-topic parameter,
/// lowercased. The 40-char hex form is normalized through a decode round
/// trip.
pub fn extract_hash(link: &str) -> Option<String> {
    let raw = INFO_HASH.captures(link)?.get(1)?.as_str();
    if raw.len() == 40 {
        hex::decode(raw).ok().map(hex::encode)
    } else {
        Some(raw.to_ascii_lowercase())
    }
}

/// Locates a `<number> <unit>` size token and converts it to bytes. Both
/// KB/MB/GB/TB and KiB/MiB/GiB/TiB are treated as powers of 1024.
pub fn parse_size(input: &str) -> Option<u64> {
    let captures = SIZE_TOKEN.captures(input)?;
    let value = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = captures.get(2)?.as_str().to_ascii_lowercase();
    let multiplier = match unit.chars().next()? {
        'b' => 1.0,
        'k' => 1024.0,
        'm' => 1024.0 * 1024.0,
        'g' => 1024.0 * 1024.0 * 1024.0,
        't' => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    Some((value * multiplier) as u64)
}

fn labeled_count(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|x| x.get(1))
        .and_then(|x| x.as_str().parse().ok())
        .unwrap_or_default()
}

pub(crate) fn seeders(description: &str) -> u64 {
    labeled_count(&SEEDERS, description)
}

pub(crate) fn leechers(description: &str) -> u64 {
    labeled_count(&LEECHERS, description)
}

pub(crate) fn downloads(description: &str) -> u64 {
    labeled_count(&DOWNLOADS, description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1.5 GiB"), Some(1_610_612_736));
        assert_eq!(parse_size("700 MB"), Some(734_003_200));
        assert_eq!(parse_size("512 B"), Some(512));
        assert_eq!(parse_size("2 TiB"), Some(2_199_023_255_552));
        assert_eq!(parse_size("170.7 MiB | Seeders: 4"), Some(178_991_923));
        assert_eq!(parse_size("no size here"), None);
        assert_eq!(parse_size("12 parsecs"), None);
        assert_eq!(parse_size(""), None);
    }

    #[test]
    fn test_extract_hash() {
        assert_eq!(
            extract_hash(
                "magnet:?xt=urn:btih:ABCDEF0123456789ABCDEF0123456789ABCDEF01&dn=example"
            ),
            Some("abcdef0123456789abcdef0123456789abcdef01".to_string())
        );
        // 32-char base32 form
        assert_eq!(
            extract_hash("magnet:?xt=urn:btih:ABCDEFGHIJKLMNOPQRSTUVWXYZ234567"),
            Some("abcdefghijklmnopqrstuvwxyz234567".to_string())
        );
        assert_eq!(extract_hash("https://nyaa.si/download/1.torrent"), None);
        assert_eq!(extract_hash("magnet:?dn=example"), None);
    }

    #[test]
    fn test_labeled_counts() {
        let description = "170.7 MiB | Seeders: 4 | Leechers: 1 | Downloads: 312";
        assert_eq!(seeders(description), 4);
        assert_eq!(leechers(description), 1);
        assert_eq!(downloads(description), 312);
        assert_eq!(seeders("no counts"), 0);
    }
}
