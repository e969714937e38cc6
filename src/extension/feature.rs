//! Feature flags switched on by negotiated capabilities.

use bitflags::bitflags;

bitflags! {
    /// Engine-wide behaviour enabled by negotiated capabilities.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FeatureSet: u32 {
        /// Position updates carry the held block.
        const HELD_BLOCK = 1 << 0;
        /// Chat messages carry a message type.
        const MESSAGE_TYPES = 1 << 1;
        /// The server maintains the tab list.
        const EXT_PLAYER_LIST = 1 << 2;
        /// Per-block place and delete permissions.
        const BLOCK_PERMISSIONS = 1 << 3;
        /// Mouse clicks are reported to the server.
        const PLAYER_CLICK = 1 << 4;
        /// Long chat input may be split into partial messages.
        const PARTIAL_MESSAGES = 1 << 5;
        /// Strings may use the upper half of code page 437.
        const FULL_CP437 = 1 << 6;
        /// Entity positions use 32-bit coordinates.
        const EXT_ENTITY_POSITIONS = 1 << 7;
        /// Latency probes in both directions.
        const TWO_WAY_PING = 1 << 8;
        /// Level data is sent without the gzip length prefix.
        const FAST_MAP = 1 << 9;
        /// Block definitions carry 16-bit texture ids.
        const EXTENDED_TEXTURES = 1 << 10;
        /// Block ids are 16 bits wide.
        const EXTENDED_BLOCKS = 1 << 11;
    }
}
