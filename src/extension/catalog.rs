//! Static description of the capabilities a client understands.
//!
//! Each known capability maps to a list of tagged effects. The registry
//! applies them generically, so adding a capability is a data change.

use super::FeatureSet;
use crate::dispatch::opcode;

/// Change applied to the engine when a capability is negotiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Grow the payload size of `opcode` by `delta` bytes.
    GrowSize {
        /// Opcode whose payload grows.
        opcode: u8,
        /// Bytes added.
        delta: u16,
    },
    /// Switch on an engine-wide flag.
    Enable(FeatureSet),
}

/// Client-side build or runtime support a capability may depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientSupport {
    /// More than 256 block types.
    ExtendedBlocks,
}

/// Precondition for applying a capability's effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Always applied.
    None,
    /// Applied only when the announced version is at least this.
    MinVersion(i32),
    /// Applied only when the client has the given support.
    ClientSupport(ClientSupport),
}

/// One capability the client knows how to honour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KnownCapability {
    /// Wire name.
    pub name: &'static str,
    /// Version assumed until the server announces one.
    pub baseline_version: i32,
    /// Precondition for the effects.
    pub requirement: Requirement,
    /// Effects applied when negotiated.
    pub effects: &'static [Effect],
}

/// How the client chooses the version it advertises for an extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionSource {
    /// A fixed version.
    Fixed(i32),
    /// The version negotiated for the known capability of the same name.
    Negotiated,
}

/// One entry of the client's own extension list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientExtension {
    /// Wire name.
    pub name: &'static str,
    /// Advertised version.
    pub version: VersionSource,
    /// Support the client needs before advertising the extension.
    pub requires: Option<ClientSupport>,
}

impl ClientExtension {
    /// A version 1 extension with no preconditions.
    #[must_use]
    pub const fn v1(name: &'static str) -> Self {
        Self {
            name,
            version: VersionSource::Fixed(1),
            requires: None,
        }
    }
}

/// Known capabilities plus the client's advertised extension list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    known: Vec<KnownCapability>,
    client: Vec<ClientExtension>,
}

impl Catalog {
    /// Build a catalog from its parts.
    #[must_use]
    pub fn new(known: Vec<KnownCapability>, client: Vec<ClientExtension>) -> Self {
        Self { known, client }
    }

    /// The capability set of the classic extension protocol.
    #[must_use]
    pub fn standard() -> Self { Self::new(STANDARD_KNOWN.to_vec(), STANDARD_CLIENT.to_vec()) }

    /// Known capabilities in catalog order.
    #[must_use]
    pub fn known(&self) -> &[KnownCapability] { &self.known }

    /// Client extension list in advertisement order.
    #[must_use]
    pub fn client_extensions(&self) -> &[ClientExtension] { &self.client }

    /// Index of the known capability named `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.known.iter().position(|known| known.name == name)
    }

    /// Every opcode some capability can resize, with the capability's name.
    pub fn resized_opcodes(&self) -> impl Iterator<Item = (u8, &'static str)> + '_ {
        self.known.iter().flat_map(|known| {
            known.effects.iter().filter_map(move |effect| match effect {
                Effect::GrowSize { opcode, .. } => Some((*opcode, known.name)),
                Effect::Enable(_) => None,
            })
        })
    }
}

const fn flag(name: &'static str, effects: &'static [Effect]) -> KnownCapability {
    KnownCapability {
        name,
        baseline_version: 1,
        requirement: Requirement::None,
        effects,
    }
}

const fn grow(opcode: u8, delta: u16) -> Effect { Effect::GrowSize { opcode, delta } }

const STANDARD_KNOWN: &[KnownCapability] = &[
    flag("HeldBlock", &[Effect::Enable(FeatureSet::HELD_BLOCK)]),
    flag("MessageTypes", &[Effect::Enable(FeatureSet::MESSAGE_TYPES)]),
    flag("ExtPlayerList", &[Effect::Enable(FeatureSet::EXT_PLAYER_LIST)]),
    flag("BlockPermissions", &[Effect::Enable(FeatureSet::BLOCK_PERMISSIONS)]),
    flag("PlayerClick", &[Effect::Enable(FeatureSet::PLAYER_CLICK)]),
    KnownCapability {
        name: "EnvMapAppearance",
        baseline_version: 2,
        requirement: Requirement::MinVersion(2),
        effects: &[grow(opcode::ENV_SET_MAP_APPEARANCE, 4)],
    },
    flag("LongerMessages", &[Effect::Enable(FeatureSet::PARTIAL_MESSAGES)]),
    flag("FullCP437", &[Effect::Enable(FeatureSet::FULL_CP437)]),
    KnownCapability {
        name: "BlockDefinitionsExt",
        baseline_version: 2,
        requirement: Requirement::MinVersion(2),
        effects: &[grow(opcode::DEFINE_BLOCK_EXT, 3)],
    },
    KnownCapability {
        name: "ExtEntityPositions",
        baseline_version: 1,
        requirement: Requirement::None,
        effects: &[
            grow(opcode::ENTITY_TELEPORT, 6),
            grow(opcode::ADD_ENTITY, 6),
            grow(opcode::EXT_ADD_ENTITY2, 6),
            Effect::Enable(FeatureSet::EXT_ENTITY_POSITIONS),
        ],
    },
    flag("TwoWayPing", &[Effect::Enable(FeatureSet::TWO_WAY_PING)]),
    KnownCapability {
        name: "FastMap",
        baseline_version: 1,
        requirement: Requirement::None,
        effects: &[grow(opcode::LEVEL_INIT, 4), Effect::Enable(FeatureSet::FAST_MAP)],
    },
    KnownCapability {
        name: "ExtendedTextures",
        baseline_version: 1,
        requirement: Requirement::None,
        effects: &[
            grow(opcode::DEFINE_BLOCK, 3),
            grow(opcode::DEFINE_BLOCK_EXT, 6),
            Effect::Enable(FeatureSet::EXTENDED_TEXTURES),
        ],
    },
    KnownCapability {
        name: "ExtendedBlocks",
        baseline_version: 1,
        requirement: Requirement::ClientSupport(ClientSupport::ExtendedBlocks),
        effects: &[
            grow(opcode::SET_BLOCK, 1),
            grow(opcode::HOLD_THIS, 1),
            grow(opcode::DEFINE_BLOCK, 1),
            grow(opcode::SET_BLOCK_PERMISSION, 1),
            grow(opcode::REMOVE_BLOCK_DEFINITION, 1),
            grow(opcode::DEFINE_BLOCK_EXT, 1),
            grow(opcode::SET_INVENTORY_ORDER, 2),
            grow(opcode::BULK_BLOCK_UPDATE, 64),
            Effect::Enable(FeatureSet::EXTENDED_BLOCKS),
        ],
    },
];

const STANDARD_CLIENT: &[ClientExtension] = &[
    ClientExtension::v1("ClickDistance"),
    ClientExtension::v1("CustomBlocks"),
    ClientExtension::v1("HeldBlock"),
    ClientExtension::v1("EmoteFix"),
    ClientExtension::v1("TextHotKey"),
    ClientExtension {
        name: "ExtPlayerList",
        version: VersionSource::Fixed(2),
        requires: None,
    },
    ClientExtension::v1("EnvColors"),
    ClientExtension::v1("SelectionCuboid"),
    ClientExtension::v1("BlockPermissions"),
    ClientExtension::v1("ChangeModel"),
    ClientExtension {
        name: "EnvMapAppearance",
        version: VersionSource::Negotiated,
        requires: None,
    },
    ClientExtension::v1("EnvWeatherType"),
    ClientExtension::v1("MessageTypes"),
    ClientExtension::v1("HackControl"),
    ClientExtension::v1("PlayerClick"),
    ClientExtension::v1("FullCP437"),
    ClientExtension::v1("LongerMessages"),
    ClientExtension::v1("BlockDefinitions"),
    ClientExtension {
        name: "BlockDefinitionsExt",
        version: VersionSource::Negotiated,
        requires: None,
    },
    ClientExtension::v1("BulkBlockUpdate"),
    ClientExtension::v1("TextColors"),
    ClientExtension::v1("EnvMapAspect"),
    ClientExtension::v1("EntityProperty"),
    ClientExtension::v1("ExtEntityPositions"),
    ClientExtension::v1("TwoWayPing"),
    ClientExtension::v1("InventoryOrder"),
    ClientExtension::v1("InstantMOTD"),
    ClientExtension::v1("FastMap"),
    ClientExtension::v1("ExtendedTextures"),
    ClientExtension {
        name: "ExtendedBlocks",
        version: VersionSource::Fixed(1),
        requires: Some(ClientSupport::ExtendedBlocks),
    },
];
