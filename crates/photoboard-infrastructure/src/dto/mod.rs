//! Data Transfer Objects for persistence.

pub mod board;

pub use board::{
    AreaDTO, BOARD_ENTITY, BoardStateDTO, BoardStateV1_0_0, BoardStateV2_0_0,
    CURRENT_FORMAT_VERSION, LEGACY_FORMAT_VERSION, LocatorDTO, MediaDTO, create_board_migrator,
    decode_board, encode_board,
};
