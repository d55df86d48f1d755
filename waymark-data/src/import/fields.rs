//! Identity and metadata attributes shared by points, paths and relations.

use chrono::{DateTime, NaiveDateTime, Utc};
use waymark_core::{Primitive, PrimitiveId, PrimitiveKind, UserKey, UserRegistry};

use super::{
    DiagnosticKind, ImportErrorKind, Location, StartElement,
    diagnostic::Diagnostics,
    schema::{Remedy, SchemaVersion},
};

/// Metadata read from one primitive element.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CommonFields {
    pub key: PrimitiveId,
    pub version: u32,
    pub visible: bool,
    pub deleted: bool,
    pub modified: bool,
    pub changeset: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub author: Option<UserKey>,
}

impl CommonFields {
    /// A complete primitive carrying these fields and no content.
    pub fn into_primitive(self) -> Primitive {
        let mut primitive = Primitive::new(self.key);
        primitive.version = self.version;
        primitive.visible = self.visible;
        primitive.deleted = self.deleted;
        primitive.modified = self.modified;
        primitive.changeset = self.changeset;
        primitive.timestamp = self.timestamp;
        primitive.author = self.author;
        primitive
    }
}

/// Reads [`CommonFields`] from an element under one schema's rules.
pub(crate) struct FieldReader<'a> {
    element: &'a StartElement,
    kind: PrimitiveKind,
    schema: SchemaVersion,
    location: Option<Location>,
}

impl<'a> FieldReader<'a> {
    pub const fn new(
        element: &'a StartElement,
        kind: PrimitiveKind,
        schema: SchemaVersion,
        location: Option<Location>,
    ) -> Self {
        Self {
            element,
            kind,
            schema,
            location,
        }
    }

    pub fn read(
        &self,
        users: &mut UserRegistry,
        diagnostics: &mut Diagnostics,
    ) -> Result<CommonFields, ImportErrorKind> {
        let key = PrimitiveId::new(self.kind, self.read_id()?);
        let timestamp = self.read_timestamp(key)?;
        let author = self.read_author(users)?;
        let visible = self
            .element
            .attribute("visible")
            .is_none_or(|value| value.eq_ignore_ascii_case("true"));
        let version = self.read_version(key, diagnostics)?;
        let (deleted, modified) = match self.element.attribute("action") {
            Some("delete") => (true, visible),
            Some("modify") => (false, true),
            _ => (false, false),
        };
        let changeset = self.read_changeset(key, diagnostics)?;
        Ok(CommonFields {
            key,
            version,
            visible,
            deleted,
            modified,
            changeset,
            timestamp,
            author,
        })
    }

    fn read_id(&self) -> Result<i64, ImportErrorKind> {
        let raw = self
            .element
            .attribute("id")
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| ImportErrorKind::MissingAttribute {
                element: self.element.name().to_owned(),
                attribute: "id",
            })?;
        let id = raw
            .parse::<i64>()
            .map_err(|_| ImportErrorKind::InvalidAttribute {
                element: self.element.name().to_owned(),
                attribute: "id",
                value: raw.to_owned(),
            })?;
        if id == 0 {
            return Err(ImportErrorKind::ZeroId { kind: self.kind });
        }
        Ok(id)
    }

    fn read_timestamp(&self, key: PrimitiveId) -> Result<Option<DateTime<Utc>>, ImportErrorKind> {
        let Some(raw) = self.element.attribute("timestamp").filter(|raw| !raw.is_empty()) else {
            return Ok(None);
        };
        parse_timestamp(raw)
            .map(Some)
            .ok_or_else(|| ImportErrorKind::InvalidTimestamp {
                id: key,
                value: raw.to_owned(),
            })
    }

    fn read_author(&self, users: &mut UserRegistry) -> Result<Option<UserKey>, ImportErrorKind> {
        let name = self.element.attribute("user");
        match (self.element.attribute("uid"), name) {
            (Some(raw), _) => {
                let uid = raw
                    .parse::<i64>()
                    .map_err(|_| ImportErrorKind::InvalidAttribute {
                        element: self.element.name().to_owned(),
                        attribute: "uid",
                        value: raw.to_owned(),
                    })?;
                Ok(Some(users.osm_user(uid, name)))
            }
            (None, Some(name)) => Ok(Some(users.local_user(name))),
            (None, None) => Ok(None),
        }
    }

    fn read_version(
        &self,
        key: PrimitiveId,
        diagnostics: &mut Diagnostics,
    ) -> Result<u32, ImportErrorKind> {
        let policy = self.schema.version_policy();
        let existing = !key.is_new();
        let Some(raw) = self.element.attribute("version") else {
            let remedy = if existing {
                policy.missing_on_existing
            } else {
                policy.missing_on_new
            };
            return self.apply(remedy, diagnostics, || ImportErrorKind::MissingVersion { id: key }, || {
                format!("{key} has no version under schema {}", self.schema)
            });
        };
        let illegal = || ImportErrorKind::IllegalVersion {
            id: key,
            value: raw.to_owned(),
        };
        let parsed = raw
            .parse::<i64>()
            .ok()
            .filter(|version| *version <= i64::from(u32::MAX));
        match parsed {
            None if existing => Err(illegal()),
            None => self.apply(Remedy::Normalise(0), diagnostics, illegal, || {
                format!("{key} has unparsable version {raw:?}")
            }),
            Some(version) if existing && version <= 0 => {
                self.apply(policy.non_positive_on_existing, diagnostics, illegal, || {
                    format!("{key} has illegal version {version}")
                })
            }
            Some(version) if version < 0 => {
                self.apply(policy.negative_on_new, diagnostics, illegal, || {
                    format!("{key} has illegal version {version}")
                })
            }
            Some(version) => u32::try_from(version).map_err(|_| illegal()),
        }
    }

    fn read_changeset(
        &self,
        key: PrimitiveId,
        diagnostics: &mut Diagnostics,
    ) -> Result<u64, ImportErrorKind> {
        let Some(raw) = self.element.attribute("changeset") else {
            return Ok(0);
        };
        match raw.parse::<u64>() {
            Ok(changeset) if changeset > 0 => Ok(changeset),
            _ if key.is_new() => {
                diagnostics.emit(
                    DiagnosticKind::ChangesetReset,
                    format!("{key} has illegal changeset {raw:?}; using 0"),
                    self.location,
                );
                Ok(0)
            }
            _ => Err(ImportErrorKind::IllegalChangeset {
                id: key,
                value: raw.to_owned(),
            }),
        }
    }

    fn apply(
        &self,
        remedy: Remedy,
        diagnostics: &mut Diagnostics,
        reject: impl FnOnce() -> ImportErrorKind,
        describe: impl FnOnce() -> String,
    ) -> Result<u32, ImportErrorKind> {
        match remedy {
            Remedy::Reject => Err(reject()),
            Remedy::Normalise(version) => {
                diagnostics.emit(
                    DiagnosticKind::VersionNormalised,
                    format!("{}; using version {version}", describe()),
                    self.location,
                );
                Ok(version)
            }
            Remedy::Default(version) => Ok(version),
        }
    }
}

/// Parse an RFC 3339 timestamp, accepting a missing offset as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
