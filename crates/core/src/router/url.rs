use crate::{AdminError, AdminResult};
use std::collections::BTreeMap;
use std::fmt;

/// Named URL parameters, e.g. `id -> 42`.
pub type Params = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A navigable URL pattern such as `/state/{id}/edit`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlPattern {
    segments: Vec<Segment>,
}

impl UrlPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Append a child pattern (child URLs are relative to their parent's).
    pub fn join(&self, child: &UrlPattern) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());
        Self { segments }
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub(crate) fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Match a path (query string and fragment ignored), capturing parameters.
    pub fn matches(&self, url: &str) -> Option<Params> {
        let path = url
            .trim_start_matches('#')
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }

    /// Build a URL from `params`. Every parameter of the pattern must be present.
    pub fn format(&self, params: &Params) -> AdminResult<String> {
        let mut url = String::new();
        for segment in &self.segments {
            url.push('/');
            match segment {
                Segment::Literal(literal) => url.push_str(literal),
                Segment::Param(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| AdminError::MissingParam(name.clone()))?;
                    if value.is_empty() || value.contains(['/', '?', '#']) {
                        return Err(AdminError::InvalidParam {
                            name: name.clone(),
                            value: value.clone(),
                        });
                    }
                    url.push_str(value);
                }
            }
        }
        if url.is_empty() {
            url.push('/');
        }
        Ok(url)
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => write!(f, "/{literal}")?,
                Segment::Param(name) => write!(f, "/{{{name}}}")?,
            }
        }
        Ok(())
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.trim_start_matches('#')
        .split('/')
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_and_display() {
        let pattern = UrlPattern::parse("/state/{id}/edit");
        assert_eq!(pattern.to_string(), "/state/{id}/edit");
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(UrlPattern::parse("").to_string(), "/");
    }

    #[test]
    fn test_join_appends_child() {
        let parent = UrlPattern::parse("/state/{id}");
        let child = UrlPattern::parse("/detail/edit");
        assert_eq!(parent.join(&child).to_string(), "/state/{id}/detail/edit");
    }

    #[test]
    fn test_matches_captures_params() {
        let pattern = UrlPattern::parse("/state/{id}/edit");
        assert_eq!(pattern.matches("/state/7/edit"), Some(params(&[("id", "7")])));
        assert_eq!(pattern.matches("#/state/7/edit?x=1"), Some(params(&[("id", "7")])));
        assert_eq!(pattern.matches("/state/7"), None);
        assert_eq!(pattern.matches("/district/7/edit"), None);
    }

    #[test]
    fn test_format_requires_params() {
        let pattern = UrlPattern::parse("/state/{id}");
        assert_eq!(pattern.format(&params(&[("id", "42")])).unwrap(), "/state/42");
        assert!(matches!(
            pattern.format(&Params::new()),
            Err(AdminError::MissingParam(name)) if name == "id"
        ));
        assert!(matches!(
            pattern.format(&params(&[("id", "4/2")])),
            Err(AdminError::InvalidParam { .. })
        ));
    }
}
