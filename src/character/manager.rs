//! Character roster backed by a directory of JSON files.

use super::attributes::Attributes;
use super::generation::{generate_character, random_name, GrowthTemplate};
use super::record::CharacterRecord;
use super::resolver::Diagnostic;
use crate::core::config::{AttributeDefinition, ForgeConfig};
use crate::core::constants::{CHARACTER_FILE_PREFIX, MAX_NAME_CHARS};
use crate::error::{ForgeError, Result};
use directories::ProjectDirs;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How a caller names a stored character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterRef {
    Id(u32),
    Name(String),
}

impl FromStr for CharacterRef {
    type Err = ForgeError;

    /// Digits are an id, anything else a name.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ForgeError::invalid_input("character reference is empty"));
        }
        Ok(match trimmed.parse::<u32>() {
            Ok(id) => CharacterRef::Id(id),
            Err(_) => CharacterRef::Name(trimmed.to_string()),
        })
    }
}

impl fmt::Display for CharacterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterRef::Id(id) => write!(f, "#{id}"),
            CharacterRef::Name(name) => write!(f, "'{name}'"),
        }
    }
}

impl From<u32> for CharacterRef {
    fn from(id: u32) -> Self {
        CharacterRef::Id(id)
    }
}

impl From<&str> for CharacterRef {
    fn from(name: &str) -> Self {
        CharacterRef::Name(name.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterPage {
    pub items: Vec<CharacterRecord>,
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

pub struct CharacterManager {
    roster_dir: PathBuf,
}

impl CharacterManager {
    /// Opens the roster named by `config.data_dir`, or the platform data
    /// directory when unset.
    pub fn new(config: &ForgeConfig) -> Result<Self> {
        match &config.data_dir {
            Some(dir) => Self::open(dir),
            None => {
                let project_dirs = ProjectDirs::from("", "", "statforge").ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "Could not determine data directory")
                })?;
                Self::open(project_dirs.data_dir())
            }
        }
    }

    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let roster_dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&roster_dir)?;
        Ok(Self { roster_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.roster_dir
    }

    fn path_for(&self, id: u32) -> PathBuf {
        self.roster_dir
            .join(format!("{CHARACTER_FILE_PREFIX}{id}.json"))
    }

    /// Ids of every `character_<id>.json` file, readable or not.
    fn stored_ids(&self) -> Result<Vec<u32>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.roster_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|stem| stem.strip_prefix(CHARACTER_FILE_PREFIX))
                .and_then(|id| id.parse::<u32>().ok());
            if let Some(id) = id {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    pub fn next_available_id(&self) -> Result<u32> {
        Ok(self.stored_ids()?.last().map_or(1, |max| max + 1))
    }

    /// Creates and stores a character seeded with catalog defaults.
    pub fn create(
        &self,
        name: &str,
        template: &GrowthTemplate,
        attributes: &Attributes,
        catalog: &[AttributeDefinition],
    ) -> Result<CharacterRecord> {
        validate_name(name)?;
        let record = CharacterRecord::builder(self.next_available_id()?, name.trim())
            .level(template.level)
            .curve_type(template.curve_type.clone())
            .all_curve_params(template.curve_params.clone())
            .all_attr_curves(template.attr_growth_curves.clone())
            .attributes(attributes.iter())
            .catalog_defaults(catalog)
            .build()?;
        self.save(&record)?;
        Ok(record)
    }

    /// Rolls and stores a random character. Without a name one is drawn from
    /// the word lists, suffixed with the id if already taken.
    pub fn generate(
        &self,
        name: Option<&str>,
        template: &GrowthTemplate,
        config: &ForgeConfig,
        rng: &mut impl Rng,
    ) -> Result<(CharacterRecord, Vec<Diagnostic>)> {
        let id = self.next_available_id()?;
        let name = match name {
            Some(name) => name.trim().to_string(),
            None => {
                let drawn = random_name(rng);
                if self.find_by_name(&drawn)?.is_some() {
                    format!("{drawn} {id}")
                } else {
                    drawn
                }
            }
        };
        validate_name(&name)?;
        let (record, diagnostics) = generate_character(id, &name, template, config, rng)?;
        self.save(&record)?;
        Ok((record, diagnostics))
    }

    /// Generates `count` characters named `<prefix><n>`, one level apart
    /// starting from the template level.
    pub fn generate_batch(
        &self,
        count: u32,
        prefix: &str,
        template: &GrowthTemplate,
        config: &ForgeConfig,
        rng: &mut impl Rng,
    ) -> Result<Vec<CharacterRecord>> {
        if count == 0 {
            return Err(ForgeError::invalid_input("batch size must be at least 1"));
        }
        let mut created = Vec::with_capacity(count as usize);
        for i in 0..count {
            let step = GrowthTemplate {
                level: template.level + i,
                ..template.clone()
            };
            let name = format!("{}{}", prefix.trim(), i + 1);
            let (record, _) = self.generate(Some(&name), &step, config, rng)?;
            created.push(record);
        }
        tracing::info!(count, prefix, "generated batch");
        Ok(created)
    }

    /// Writes `record`, replacing any stored character with the same id.
    pub fn save(&self, record: &CharacterRecord) -> Result<()> {
        validate_name(record.name())?;
        record.validate()?;
        if let Some(existing) = self.find_by_name(record.name())? {
            if existing.id() != record.id() {
                return Err(ForgeError::DuplicateName(record.name().to_string()));
            }
        }

        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.path_for(record.id()), json)?;
        tracing::info!(id = record.id(), name = record.name(), "saved character");
        Ok(())
    }

    pub fn load(&self, reference: &CharacterRef) -> Result<CharacterRecord> {
        match reference {
            CharacterRef::Id(id) => self.load_id(*id),
            CharacterRef::Name(name) => self
                .find_by_name(name)?
                .ok_or_else(|| ForgeError::NotFound(reference.to_string())),
        }
    }

    fn load_id(&self, id: u32) -> Result<CharacterRecord> {
        let path = self.path_for(id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ForgeError::NotFound(format!("#{id}")));
            }
            Err(e) => return Err(e.into()),
        };
        let record: CharacterRecord = serde_json::from_str(&content)?;
        if record.id() != id {
            return Err(ForgeError::invalid_input(format!(
                "{} holds character #{}, not #{id}",
                path.display(),
                record.id()
            )));
        }
        Ok(record)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<CharacterRecord>> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .find(|record| record.name().to_lowercase() == wanted))
    }

    /// Loads, edits and stores a character in one step.
    pub fn update(
        &self,
        reference: &CharacterRef,
        edit: impl FnOnce(&mut CharacterRecord) -> Result<()>,
    ) -> Result<CharacterRecord> {
        let mut record = self.load(reference)?;
        edit(&mut record)?;
        self.save(&record)?;
        Ok(record)
    }

    /// Every readable character, sorted by id.
    pub fn list(&self) -> Result<Vec<CharacterRecord>> {
        let mut records = Vec::new();
        for id in self.stored_ids()? {
            match self.load_id(id) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(id, error = %e, "skipping unreadable character file");
                }
            }
        }
        Ok(records)
    }

    pub fn delete(&self, id: u32) -> Result<()> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => {
                tracing::info!(id, "deleted character");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ForgeError::NotFound(format!("#{id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// One page of characters whose name contains `search`, ignoring case.
    pub fn find_page(
        &self,
        search: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<RosterPage> {
        if page == 0 || page_size == 0 {
            return Err(ForgeError::invalid_input(
                "page and page size start at 1",
            ));
        }
        let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
        let matching: Vec<CharacterRecord> = self
            .list()?
            .into_iter()
            .filter(|record| record.name().to_lowercase().contains(&needle))
            .collect();

        let total = matching.len();
        let total_pages = total.div_ceil(page_size).max(1);
        let items = matching
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Ok(RosterPage {
            items,
            page,
            total_pages,
            total,
        })
    }
}

pub fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ForgeError::invalid_input("Name cannot be empty"));
    }

    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(ForgeError::invalid_input(format!(
            "Name must be {MAX_NAME_CHARS} characters or less"
        )));
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ForgeError::invalid_input(
            "Name cannot be only digits; digits alone refer to an id",
        ));
    }

    let valid_chars = trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_');

    if !valid_chars {
        return Err(ForgeError::invalid_input(
            "Name can only contain letters, numbers, spaces, hyphens, and underscores",
        ));
    }

    Ok(())
}
