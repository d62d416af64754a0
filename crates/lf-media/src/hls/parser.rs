//! Reading master playlists back.
//!
//! Covers the tags this crate emits: `#EXTM3U`, `#EXT-X-VERSION` and
//! `#EXT-X-STREAM-INF` followed by a URI line. Other tags are skipped.

use super::types::{MasterPlaylist, Variant};
use crate::error::{Error, Result};

const STREAM_INF: &str = "#EXT-X-STREAM-INF:";
const VERSION: &str = "#EXT-X-VERSION:";

/// Parse master playlist text into a [`MasterPlaylist`].
pub fn parse_master_playlist(text: &str) -> Result<MasterPlaylist> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    match lines.next() {
        Some((_, "#EXTM3U")) => {}
        _ => return Err(Error::MissingHeader),
    }

    let mut version = 1;
    let mut variants = Vec::new();
    let mut pending: Option<(usize, Variant)> = None;

    for (line_no, line) in lines {
        if let Some(rest) = line.strip_prefix(VERSION) {
            version = rest
                .trim()
                .parse()
                .map_err(|_| Error::invalid(line_no, format!("bad version '{rest}'")))?;
        } else if let Some(rest) = line.strip_prefix(STREAM_INF) {
            if let Some((prev, _)) = pending {
                return Err(Error::MissingUri { line: prev });
            }
            pending = Some((line_no, parse_stream_inf(line_no, rest)?));
        } else if line.starts_with('#') {
            continue;
        } else if let Some((_, mut variant)) = pending.take() {
            variant.uri = line.trim().to_string();
            variants.push(variant);
        } else {
            return Err(Error::invalid(line_no, "URI without #EXT-X-STREAM-INF"));
        }
    }

    if let Some((line, _)) = pending {
        return Err(Error::MissingUri { line });
    }

    Ok(MasterPlaylist { version, variants })
}

fn parse_stream_inf(line_no: usize, attrs: &str) -> Result<Variant> {
    let mut bandwidth = None;
    let mut variant = Variant {
        bandwidth: 0,
        average_bandwidth: None,
        resolution: None,
        codecs: String::new(),
        uri: String::new(),
    };

    for (key, value) in split_attributes(attrs) {
        let number = |v: &str| {
            v.parse::<u64>()
                .map_err(|_| Error::invalid(line_no, format!("{key} is not a number: '{v}'")))
        };
        match key {
            "BANDWIDTH" => bandwidth = Some(number(value)?),
            "AVERAGE-BANDWIDTH" => variant.average_bandwidth = Some(number(value)?),
            "RESOLUTION" => {
                let parsed = value
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
                variant.resolution = Some(parsed.ok_or_else(|| {
                    Error::invalid(line_no, format!("bad RESOLUTION '{value}'"))
                })?);
            }
            "CODECS" => variant.codecs = unquote(value).to_string(),
            _ => {}
        }
    }

    variant.bandwidth =
        bandwidth.ok_or_else(|| Error::invalid(line_no, "STREAM-INF without BANDWIDTH"))?;
    Ok(variant)
}

/// Split `K=V,K="a,b"` on commas that are outside quotes.
fn split_attributes(attrs: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in attrs.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                out.extend(attrs[start..i].split_once('='));
                start = i + 1;
            }
            _ => {}
        }
    }
    out.extend(attrs[start..].split_once('='));

    out.into_iter().map(|(k, v)| (k.trim(), v.trim())).collect()
}

fn unquote(v: &str) -> &str {
    v.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hls::generator::build_master_manifest;
    use assert_matches::assert_matches;
    use lf_core::RenditionLadder;

    #[test]
    fn parses_generated_manifest_in_order() {
        let ladder = RenditionLadder::plan();
        let parsed = parse_master_playlist(&build_master_manifest(ladder.renditions())).unwrap();

        assert_eq!(parsed.version, 3);
        assert_eq!(parsed.variants.len(), ladder.len());
        for (variant, spec) in parsed.variants.iter().zip(ladder.iter()) {
            assert_eq!(variant.bandwidth, spec.bandwidth);
            assert_eq!(variant.average_bandwidth, Some(spec.average_bandwidth));
            assert_eq!(variant.resolution, Some((spec.width, spec.height)));
            assert_eq!(variant.codecs, spec.codecs);
            assert_eq!(variant.uri, format!("{}/index.m3u8", spec.name));
        }
    }

    #[test]
    fn quoted_codecs_keep_commas() {
        let attrs =
            split_attributes(r#"BANDWIDTH=1,CODECS="avc1.640028,mp4a.40.2",RESOLUTION=2x2"#);
        assert_eq!(
            attrs,
            vec![
                ("BANDWIDTH", "1"),
                ("CODECS", "\"avc1.640028,mp4a.40.2\""),
                ("RESOLUTION", "2x2"),
            ]
        );
    }

    #[test]
    fn crlf_and_unknown_tags_tolerated() {
        let text = "#EXTM3U\r\n#EXT-X-VERSION:3\r\n#EXT-X-INDEPENDENT-SEGMENTS\r\n\
                    #EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360\r\nlow/index.m3u8\r\n";
        let parsed = parse_master_playlist(text).unwrap();
        assert_eq!(parsed.variants.len(), 1);
        assert_eq!(parsed.variants[0].uri, "low/index.m3u8");
        assert_eq!(parsed.variants[0].average_bandwidth, None);
    }

    #[test]
    fn missing_header_rejected() {
        assert_matches!(
            parse_master_playlist("#EXT-X-VERSION:3\n"),
            Err(Error::MissingHeader)
        );
    }

    #[test]
    fn stream_without_uri_rejected() {
        let text = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\n";
        assert_matches!(parse_master_playlist(text), Err(Error::MissingUri { line: 2 }));
    }

    #[test]
    fn bad_bandwidth_rejected() {
        let text = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=fast\na/index.m3u8\n";
        assert_matches!(parse_master_playlist(text), Err(Error::Invalid { line: 2, .. }));
    }
}
