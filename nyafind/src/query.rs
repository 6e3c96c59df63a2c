use anyhow::Result;
use nyafind_types::{AudioMode, SearchCriteria};

/// Resolutions the index reliably carries uploads for.
pub const QUALITIES: &[&str] = &["1080", "720", "540", "480"];

fn audio_group(audio: AudioMode) -> &'static str {
    match audio {
        AudioMode::Dub => "(dub OR dubbed OR dual)",
        AudioMode::Sub => "(sub OR subs OR subtitle)",
    }
}

fn finish(mut query: String, criteria: &SearchCriteria) -> String {
    if let Some(audio) = criteria.audio {
        query.push(' ');
        query.push_str(audio_group(audio));
    }
    if let Some(resolution) = &criteria.resolution {
        query.push(' ');
        query.push_str(resolution);
    }
    for exclusion in &criteria.exclusions {
        query.push_str(" -");
        query.push_str(exclusion);
    }
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Query for one episode. Fails before any network access when the criteria
/// carry no episode identifier.
pub fn single_query(criteria: &SearchCriteria) -> Result<String> {
    Ok(finish(criteria.episode_term()?, criteria))
}

/// Query biased toward bundled releases.
pub fn batch_query(criteria: &SearchCriteria) -> Result<String> {
    let mut root = criteria.series_term()?;
    root.push_str(" (batch OR complete)");
    Ok(finish(root, criteria))
}

/// Movies search at series granularity without the bundle bias.
pub fn movie_query(criteria: &SearchCriteria) -> Result<String> {
    Ok(finish(criteria.series_term()?, criteria))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            titles: vec!["Example".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_single_query() {
        let mut criteria = criteria();
        criteria.episode = Some(3);
        criteria.resolution = Some("1080p".to_string());
        assert_eq!(single_query(&criteria).unwrap(), "Example 03 1080p");
    }

    #[test]
    fn test_audio_and_exclusions() {
        let mut criteria = criteria();
        criteria.audio = Some(AudioMode::Dub);
        criteria.exclusions = vec!["HEVC".to_string(), "x265".to_string()];
        assert_eq!(
            single_query(&criteria).unwrap(),
            "Example (dub OR dubbed OR dual) -HEVC -x265"
        );
    }

    #[test]
    fn test_batch_token_forced() {
        let query = batch_query(&criteria()).unwrap();
        assert_eq!(query, "Example (batch OR complete)");
    }

    #[test]
    fn test_movie_uses_series_root() {
        let mut criteria = criteria();
        criteria.anidb_aid = Some(9541);
        assert_eq!(movie_query(&criteria).unwrap(), "9541");
    }

    #[test]
    fn test_whitespace_trimmed() {
        let mut criteria = SearchCriteria {
            titles: vec!["  Example  ".to_string()],
            ..Default::default()
        };
        criteria.resolution = Some("720p".to_string());
        assert_eq!(single_query(&criteria).unwrap(), "Example 720p");
    }

    #[test]
    fn test_missing_identifier() {
        assert!(single_query(&SearchCriteria::default()).is_err());
        assert!(batch_query(&SearchCriteria::default()).is_err());
        assert!(movie_query(&SearchCriteria::default()).is_err());
    }
}
