//! Opcode constants and baseline payload sizes of the classic protocol and its
//! extensions.
//!
//! Sizes exclude the leading opcode byte.

/// Server identification (server to client) and login (client to server).
pub const HANDSHAKE: u8 = 0;
/// Keepalive.
pub const PING: u8 = 1;
/// Start of a level transfer.
pub const LEVEL_INIT: u8 = 2;
/// Compressed level data chunk.
pub const LEVEL_DATA_CHUNK: u8 = 3;
/// End of a level transfer.
pub const LEVEL_FINALISE: u8 = 4;
/// Block placed or deleted by the client.
pub const SET_BLOCK_CLIENT: u8 = 5;
/// Block change broadcast by the server.
pub const SET_BLOCK: u8 = 6;
/// Entity spawn.
pub const ADD_ENTITY: u8 = 7;
/// Absolute entity position; also the client's position update.
pub const ENTITY_TELEPORT: u8 = 8;
/// Relative position and orientation update.
pub const REL_POS_AND_ORIENTATION: u8 = 9;
/// Relative position update.
pub const REL_POS: u8 = 10;
/// Orientation update.
pub const ORIENTATION: u8 = 11;
/// Entity despawn.
pub const REMOVE_ENTITY: u8 = 12;
/// Chat message.
pub const MESSAGE: u8 = 13;
/// Disconnect with a reason.
pub const KICK: u8 = 14;
/// Operator status change.
pub const SET_PERMISSION: u8 = 15;
/// Extension list header.
pub const EXT_INFO: u8 = 16;
/// One extension name and version.
pub const EXT_ENTRY: u8 = 17;
/// Reach distance.
pub const SET_CLICK_DISTANCE: u8 = 18;
/// Custom block support level.
pub const CUSTOM_BLOCK_LEVEL: u8 = 19;
/// Force the held block.
pub const HOLD_THIS: u8 = 20;
/// Text hotkey binding.
pub const SET_TEXT_HOTKEY: u8 = 21;
/// Player list entry.
pub const EXT_ADD_PLAYER_NAME: u8 = 22;
/// Entity spawn with skin name (first revision).
pub const EXT_ADD_ENTITY: u8 = 23;
/// Player list removal.
pub const EXT_REMOVE_PLAYER_NAME: u8 = 24;
/// Environment colour.
pub const ENV_SET_COLOR: u8 = 25;
/// Selection cuboid.
pub const MAKE_SELECTION: u8 = 26;
/// Selection removal.
pub const REMOVE_SELECTION: u8 = 27;
/// Per-block place and delete permission.
pub const SET_BLOCK_PERMISSION: u8 = 28;
/// Entity model change.
pub const CHANGE_MODEL: u8 = 29;
/// Map appearance.
pub const ENV_SET_MAP_APPEARANCE: u8 = 30;
/// Weather type.
pub const ENV_SET_WEATHER_TYPE: u8 = 31;
/// Movement hack permissions and jump height.
pub const HACK_CONTROL: u8 = 32;
/// Entity spawn with skin name (second revision).
pub const EXT_ADD_ENTITY2: u8 = 33;
/// Mouse click report sent by the client.
pub const PLAYER_CLICK: u8 = 34;
/// Block definition.
pub const DEFINE_BLOCK: u8 = 35;
/// Block definition removal.
pub const REMOVE_BLOCK_DEFINITION: u8 = 36;
/// Extended block definition.
pub const DEFINE_BLOCK_EXT: u8 = 37;
/// Batched block changes.
pub const BULK_BLOCK_UPDATE: u8 = 38;
/// Chat colour code.
pub const SET_TEXT_COLOR: u8 = 39;
/// Texture pack url.
pub const SET_MAP_ENV_URL: u8 = 40;
/// Map environment property.
pub const SET_MAP_ENV_PROPERTY: u8 = 41;
/// Entity property.
pub const SET_ENTITY_PROPERTY: u8 = 42;
/// Two-way latency probe.
pub const TWO_WAY_PING: u8 = 43;
/// Inventory ordering.
pub const SET_INVENTORY_ORDER: u8 = 44;

/// Every opcode the server may send, paired with its baseline payload size.
pub const STANDARD: &[(u8, u16)] = &[
    (HANDSHAKE, 130),
    (PING, 0),
    (LEVEL_INIT, 0),
    (LEVEL_DATA_CHUNK, 1027),
    (LEVEL_FINALISE, 6),
    (SET_BLOCK, 7),
    (ADD_ENTITY, 73),
    (ENTITY_TELEPORT, 9),
    (REL_POS_AND_ORIENTATION, 6),
    (REL_POS, 4),
    (ORIENTATION, 3),
    (REMOVE_ENTITY, 1),
    (MESSAGE, 65),
    (KICK, 64),
    (SET_PERMISSION, 1),
    (EXT_INFO, 66),
    (EXT_ENTRY, 68),
    (SET_CLICK_DISTANCE, 2),
    (CUSTOM_BLOCK_LEVEL, 1),
    (HOLD_THIS, 2),
    (SET_TEXT_HOTKEY, 133),
    (EXT_ADD_PLAYER_NAME, 195),
    (EXT_ADD_ENTITY, 129),
    (EXT_REMOVE_PLAYER_NAME, 2),
    (ENV_SET_COLOR, 7),
    (MAKE_SELECTION, 85),
    (REMOVE_SELECTION, 1),
    (SET_BLOCK_PERMISSION, 3),
    (CHANGE_MODEL, 65),
    (ENV_SET_MAP_APPEARANCE, 68),
    (ENV_SET_WEATHER_TYPE, 1),
    (HACK_CONTROL, 7),
    (EXT_ADD_ENTITY2, 137),
    (DEFINE_BLOCK, 79),
    (REMOVE_BLOCK_DEFINITION, 1),
    (DEFINE_BLOCK_EXT, 84),
    (BULK_BLOCK_UPDATE, 1281),
    (SET_TEXT_COLOR, 5),
    (SET_MAP_ENV_URL, 64),
    (SET_MAP_ENV_PROPERTY, 5),
    (SET_ENTITY_PROPERTY, 6),
    (TWO_WAY_PING, 3),
    (SET_INVENTORY_ORDER, 2),
];

/// Baseline payload size of a server-sent opcode.
#[must_use]
pub fn baseline_size(opcode: u8) -> Option<u16> {
    STANDARD
        .iter()
        .find(|(op, _)| *op == opcode)
        .map(|(_, size)| *size)
}

/// Human-readable opcode name for diagnostics.
#[must_use]
pub fn name(opcode: u8) -> &'static str {
    match opcode {
        HANDSHAKE => "Handshake",
        PING => "Ping",
        LEVEL_INIT => "LevelInit",
        LEVEL_DATA_CHUNK => "LevelDataChunk",
        LEVEL_FINALISE => "LevelFinalise",
        SET_BLOCK_CLIENT => "SetBlockClient",
        SET_BLOCK => "SetBlock",
        ADD_ENTITY => "AddEntity",
        ENTITY_TELEPORT => "EntityTeleport",
        REL_POS_AND_ORIENTATION => "RelPosAndOrientationUpdate",
        REL_POS => "RelPosUpdate",
        ORIENTATION => "OrientationUpdate",
        REMOVE_ENTITY => "RemoveEntity",
        MESSAGE => "Message",
        KICK => "Kick",
        SET_PERMISSION => "SetPermission",
        EXT_INFO => "ExtInfo",
        EXT_ENTRY => "ExtEntry",
        SET_CLICK_DISTANCE => "SetClickDistance",
        CUSTOM_BLOCK_LEVEL => "CustomBlockSupportLevel",
        HOLD_THIS => "HoldThis",
        SET_TEXT_HOTKEY => "SetTextHotkey",
        EXT_ADD_PLAYER_NAME => "ExtAddPlayerName",
        EXT_ADD_ENTITY => "ExtAddEntity",
        EXT_REMOVE_PLAYER_NAME => "ExtRemovePlayerName",
        ENV_SET_COLOR => "EnvSetColor",
        MAKE_SELECTION => "MakeSelection",
        REMOVE_SELECTION => "RemoveSelection",
        SET_BLOCK_PERMISSION => "SetBlockPermission",
        CHANGE_MODEL => "ChangeModel",
        ENV_SET_MAP_APPEARANCE => "EnvSetMapAppearance",
        ENV_SET_WEATHER_TYPE => "EnvSetWeatherType",
        HACK_CONTROL => "HackControl",
        EXT_ADD_ENTITY2 => "ExtAddEntity2",
        PLAYER_CLICK => "PlayerClick",
        DEFINE_BLOCK => "DefineBlock",
        REMOVE_BLOCK_DEFINITION => "RemoveBlockDefinition",
        DEFINE_BLOCK_EXT => "DefineBlockExt",
        BULK_BLOCK_UPDATE => "BulkBlockUpdate",
        SET_TEXT_COLOR => "SetTextColor",
        SET_MAP_ENV_URL => "SetMapEnvUrl",
        SET_MAP_ENV_PROPERTY => "SetMapEnvProperty",
        SET_ENTITY_PROPERTY => "SetEntityProperty",
        TWO_WAY_PING => "TwoWayPing",
        SET_INVENTORY_ORDER => "SetInventoryOrder",
        _ => "Unknown",
    }
}
