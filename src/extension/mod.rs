//! Capability negotiation.
//!
//! The server announces its extension count in `ExtInfo` and then names each
//! extension in an `ExtEntry`. [`CapabilityRegistry`] records what was
//! announced, applies the catalog's effects to the opcode table and reports
//! when the client should send its own extension list.

use tracing::{debug, warn};

use crate::dispatch::OpcodeTable;

pub mod catalog;
mod feature;

pub use catalog::{
    Catalog,
    ClientExtension,
    ClientSupport,
    Effect,
    KnownCapability,
    Requirement,
    VersionSource,
};
pub use feature::FeatureSet;

/// Negotiation state of one known capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityEntry {
    /// Wire name.
    pub name: &'static str,
    /// Announced version, or the catalog baseline.
    pub version: i32,
    /// The server announced this capability.
    pub announced: bool,
    /// The capability's effects were applied.
    pub enabled: bool,
}

/// What [`CapabilityRegistry::accept_entry`] did with an announcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Effects were applied.
    Applied,
    /// The capability is known but its requirement failed; only the version
    /// was recorded.
    Unmet,
    /// The capability had already been announced.
    Duplicate,
    /// The name is not in the catalog.
    Unknown,
}

/// Per-connection negotiation state.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: Vec<CapabilityEntry>,
    features: FeatureSet,
    server_app: Option<String>,
    remaining: u16,
    replied: bool,
}

impl CapabilityRegistry {
    /// Create a registry at baseline for `catalog`.
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        let mut registry = Self::default();
        registry.reset(catalog);
        registry
    }

    /// Forget everything negotiated and return to catalog baselines.
    pub fn reset(&mut self, catalog: &Catalog) {
        self.entries.clear();
        self.entries
            .extend(catalog.known().iter().map(|known| CapabilityEntry {
                name: known.name,
                version: known.baseline_version,
                announced: false,
                enabled: false,
            }));
        self.features = FeatureSet::empty();
        self.server_app = None;
        self.remaining = 0;
        self.replied = false;
    }

    /// Record the server's `ExtInfo` header.
    pub fn begin(&mut self, app_name: impl Into<String>, count: u16) {
        let app_name = app_name.into();
        debug!(app = %app_name, count, "server announced extensions");
        self.server_app = Some(app_name);
        self.remaining = count;
    }

    /// Apply one server `ExtEntry`.
    ///
    /// Unknown names are ignored. A known capability whose requirement fails
    /// records the announced version but changes nothing else.
    pub fn accept_entry<C>(
        &mut self,
        catalog: &Catalog,
        name: &str,
        version: i32,
        table: &mut OpcodeTable<C>,
        supports: impl Fn(ClientSupport) -> bool,
    ) -> EntryOutcome {
        self.remaining = self.remaining.saturating_sub(1);
        let Some(index) = catalog.position(name) else {
            debug!(capability = name, version, "ignoring unknown capability");
            return EntryOutcome::Unknown;
        };
        let (Some(known), Some(entry)) = (catalog.known().get(index), self.entries.get_mut(index))
        else {
            return EntryOutcome::Unknown;
        };
        if entry.announced {
            warn!(capability = name, version, "ignoring duplicate capability announcement");
            return EntryOutcome::Duplicate;
        }
        entry.announced = true;
        entry.version = version;

        let met = match known.requirement {
            Requirement::None => true,
            Requirement::MinVersion(min) => version >= min,
            Requirement::ClientSupport(support) => supports(support),
        };
        if !met {
            debug!(capability = name, version, "capability requirement not met");
            return EntryOutcome::Unmet;
        }

        for effect in known.effects {
            match *effect {
                Effect::GrowSize { opcode, delta } => table.grow_size(opcode, delta),
                Effect::Enable(feature) => self.features.insert(feature),
            }
        }
        entry.enabled = true;
        debug!(capability = name, version, "capability enabled");
        EntryOutcome::Applied
    }

    /// Entries still expected from the server.
    #[must_use]
    pub fn remaining(&self) -> u16 { self.remaining }

    /// The server sent `ExtInfo` and every announced entry has arrived.
    #[must_use]
    pub fn is_complete(&self) -> bool { self.server_app.is_some() && self.remaining == 0 }

    /// Returns `true` exactly once, when negotiation completes.
    pub fn take_reply_due(&mut self) -> bool {
        if self.is_complete() && !self.replied {
            self.replied = true;
            return true;
        }
        false
    }

    /// Application name from the server's `ExtInfo`.
    #[must_use]
    pub fn server_app(&self) -> Option<&str> { self.server_app.as_deref() }

    /// Features switched on so far.
    #[must_use]
    pub fn features(&self) -> FeatureSet { self.features }

    /// Per-capability negotiation state in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[CapabilityEntry] { &self.entries }

    /// Negotiation state of the capability named `name`.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&CapabilityEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Whether `name` was negotiated and applied.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool { self.entry(name).is_some_and(|e| e.enabled) }

    /// The client's extension list with resolved versions.
    pub fn client_extensions<'a>(
        &'a self,
        catalog: &'a Catalog,
        supports: impl Fn(ClientSupport) -> bool + 'a,
    ) -> impl Iterator<Item = (&'static str, i32)> + 'a {
        catalog
            .client_extensions()
            .iter()
            .filter(move |ext| ext.requires.is_none_or(&supports))
            .map(|ext| {
                let version = match ext.version {
                    VersionSource::Fixed(version) => version,
                    VersionSource::Negotiated => self.entry(ext.name).map_or(1, |e| e.version),
                };
                (ext.name, version)
            })
    }
}
