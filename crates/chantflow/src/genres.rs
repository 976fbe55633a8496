//! Chant genres that phrase contour datasets are generated for.

use anyhow::{bail, Result};

/// A genre key and its office part code in the corpus tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub name: &'static str,
    pub office_part: &'static str,
}

impl Genre {
    /// Dataset id used for output file names, e.g. `liber-antiphons`.
    pub fn dataset_id(&self) -> String {
        format!("liber-{}", self.name)
    }
}

pub const ALL_GENRES: &[Genre] = &[
    Genre { name: "antiphons", office_part: "an" },
    Genre { name: "hymns", office_part: "hy" },
    Genre { name: "alleluias", office_part: "al" },
    Genre { name: "introits", office_part: "in" },
    Genre { name: "communions", office_part: "co" },
    Genre { name: "responsories", office_part: "re" },
    Genre { name: "offertories", office_part: "of" },
    Genre { name: "graduals", office_part: "gr" },
    Genre { name: "kyries", office_part: "ky" },
    Genre { name: "tracts", office_part: "tr" },
];

/// Look up a genre by key. Unknown keys are an error.
pub fn lookup(name: &str) -> Result<&'static Genre> {
    match ALL_GENRES.iter().find(|g| g.name == name) {
        Some(genre) => Ok(genre),
        None => {
            let known: Vec<&str> = ALL_GENRES.iter().map(|g| g.name).collect();
            bail!("Unknown genre '{}' (expected one of: {})", name, known.join(", "))
        }
    }
}

/// Genres selected on the command line: `all` or a single key.
pub fn select(name: &str) -> Result<Vec<&'static Genre>> {
    if name == "all" {
        return Ok(ALL_GENRES.iter().collect());
    }
    Ok(vec![lookup(name)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let genre = lookup("graduals").unwrap();
        assert_eq!(genre.office_part, "gr");
        assert_eq!(genre.dataset_id(), "liber-graduals");
    }

    #[test]
    fn test_unknown_genre_is_fatal() {
        let err = lookup("sequences").unwrap_err();
        assert!(err.to_string().contains("sequences"));
        assert!(select("sequences").is_err());
    }

    #[test]
    fn test_select_all_keeps_order() {
        let all = select("all").unwrap();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].name, "antiphons");
        assert_eq!(all[9].name, "tracts");
    }
}
