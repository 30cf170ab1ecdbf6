use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use albumhub_core::{ArtistId, DomainError, DomainResult, Entity};

use crate::validate::FieldCheck;

/// Artist age in years.
///
/// Accepted as a number or a numeric string; always rendered as a decimal
/// string (`"40"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Age(u32);

impl Age {
    pub fn new(years: i64) -> DomainResult<Self> {
        if !(0..=i64::from(i32::MAX)).contains(&years) {
            return Err(DomainError::validation(format!(
                "age must be a non-negative integer, got {years}"
            )));
        }
        Ok(Self(years as u32))
    }

    pub fn years(&self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for Age {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Age {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// A persisted artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub age: Age,
    pub place_of_birth: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Artist {
    type Id = ArtistId;

    fn id(&self) -> ArtistId {
        self.id
    }
}

/// Validated payload for creating an artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtist {
    pub name: String,
    pub age: Age,
    pub place_of_birth: String,
}

impl NewArtist {
    /// Every field is required.
    pub fn try_new(
        name: Option<String>,
        age: Option<i64>,
        place_of_birth: Option<String>,
    ) -> DomainResult<Self> {
        let mut check = FieldCheck::new();
        let name = check.required_text("name", name);
        let age = check.required("age", age).and_then(|a| checked_age(&mut check, a));
        let place_of_birth = check.required_text("pob", place_of_birth);
        check.finish()?;

        match (name, age, place_of_birth) {
            (Some(name), Some(age), Some(place_of_birth)) => Ok(Self {
                name,
                age,
                place_of_birth,
            }),
            _ => Err(DomainError::validation("incomplete artist payload")),
        }
    }

    /// Materialize the record once the store has assigned an id.
    pub fn into_artist(self, id: ArtistId, now: DateTime<Utc>) -> Artist {
        Artist {
            id,
            name: self.name,
            age: self.age,
            place_of_birth: self.place_of_birth,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field overwrites for an artist update.
///
/// Every submitted field replaces the stored value; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistChanges {
    pub name: Option<String>,
    pub age: Option<Age>,
    pub place_of_birth: Option<String>,
}

impl ArtistChanges {
    pub fn try_new(
        name: Option<String>,
        age: Option<i64>,
        place_of_birth: Option<String>,
    ) -> DomainResult<Self> {
        let mut check = FieldCheck::new();
        let name = check.optional_text("name", name);
        let age = age.and_then(|a| checked_age(&mut check, a));
        let place_of_birth = check.optional_text("pob", place_of_birth);
        check.finish()?;

        Ok(Self {
            name,
            age,
            place_of_birth,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.place_of_birth.is_none()
    }

    pub fn apply_to(&self, artist: &mut Artist, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            artist.name = name.clone();
        }
        if let Some(age) = self.age {
            artist.age = age;
        }
        if let Some(pob) = &self.place_of_birth {
            artist.place_of_birth = pob.clone();
        }
        artist.updated_at = now;
    }
}

fn checked_age(check: &mut FieldCheck, years: i64) -> Option<Age> {
    match Age::new(years) {
        Ok(age) => Some(age),
        Err(e) => {
            check.invalid(match e {
                DomainError::Validation(msg) => msg,
                other => other.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t_dog() -> Artist {
        NewArtist::try_new(Some("t-dog".into()), Some(40), Some("LA".into()))
            .unwrap()
            .into_artist(ArtistId::new(1), Utc::now())
    }

    #[test]
    fn new_artist_trims_and_keeps_fields() {
        let artist = NewArtist::try_new(Some("  t-dog ".into()), Some(40), Some("LA".into())).unwrap();
        assert_eq!(artist.name, "t-dog");
        assert_eq!(artist.age.years(), 40);
        assert_eq!(artist.place_of_birth, "LA");
    }

    #[test]
    fn new_artist_reports_every_missing_field() {
        let err = NewArtist::try_new(None, None, None).unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("name"));
                assert!(msg.contains("age"));
                assert!(msg.contains("pob"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn new_artist_rejects_negative_age_and_blank_name() {
        let err = NewArtist::try_new(Some("   ".into()), Some(-1), Some("LA".into())).unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("name must not be blank"));
                assert!(msg.contains("non-negative"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn changes_overwrite_only_submitted_fields() {
        let mut artist = t_dog();
        let created = artist.created_at;
        let changes = ArtistChanges::try_new(None, Some(41), Some("NYC".into())).unwrap();

        changes.apply_to(&mut artist, Utc::now());

        assert_eq!(artist.name, "t-dog");
        assert_eq!(artist.age.years(), 41);
        assert_eq!(artist.place_of_birth, "NYC");
        assert_eq!(artist.created_at, created);
    }

    #[test]
    fn empty_changes_are_detected() {
        assert!(ArtistChanges::try_new(None, None, None).unwrap().is_empty());
    }

    #[test]
    fn age_renders_as_string() {
        let json = serde_json::to_value(Age::new(40).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!("40"));
    }
}
