//! Channel address table of the cube PCB
//!
//! Every column of the cube (an `(x, z)` position) has one RGB LED per layer,
//! and the three primaries of a column are wired to three outputs of the
//! driver chain. The wiring is fixed by the board, so the mapping is a plain
//! table rather than something computed.
//!
//! Rows are stored far side first: logical `z = 0` is the front of the cube,
//! which is the last row of the table.

use crate::store::{DEPTH, WIDTH};

/// LED primary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Primary {
    Red,
    Green,
    Blue,
}

/// Physical channels indexed by `[DEPTH - 1 - z][x]`, each entry `[blue, green, red]`
#[rustfmt::skip]
static LED_CHANNELS: [[[u16; 3]; WIDTH]; DEPTH] = [
    [[  3,   4,   5], [  6,   7,   8], [  9,  10,  11],
     [ 99, 100, 101], [102, 103, 104], [105, 106, 107],
     [195, 196, 197], [198, 199, 200], [201, 202, 203]],
    [[  1,   2,   0], [ 22,  23,  24], [ 25,  26,  27],
     [ 97,  98,  96], [118, 119, 120], [121, 122, 123],
     [193, 194, 192], [214, 215, 216], [217, 218, 219]],
    [[ 17,  18,  16], [ 19,  20,  21], [ 28,  29,  30],
     [113, 114, 112], [115, 116, 117], [124, 125, 126],
     [209, 210, 208], [211, 212, 213], [220, 221, 222]],
    [[ 35,  36,  37], [ 38,  39,  40], [ 41,  42,  43],
     [131, 132, 133], [134, 135, 136], [137, 138, 139],
     [227, 228, 229], [230, 231, 232], [233, 234, 235]],
    [[ 33,  34,  32], [ 54,  55,  56], [ 57,  58,  59],
     [129, 130, 128], [150, 151, 152], [153, 154, 155],
     [225, 226, 224], [246, 247, 248], [249, 250, 251]],
    [[ 49,  50,  48], [ 51,  52,  53], [ 60,  61,  62],
     [145, 146, 144], [147, 148, 149], [156, 157, 158],
     [241, 242, 240], [243, 244, 245], [252, 253, 254]],
    [[ 67,  68,  69], [ 70,  71,  72], [ 73,  74,  75],
     [163, 164, 165], [166, 167, 168], [169, 170, 171],
     [259, 260, 261], [262, 263, 264], [265, 266, 267]],
    [[ 65,  66,  64], [ 86,  87,  88], [ 89,  90,  91],
     [161, 162, 160], [182, 183, 184], [185, 186, 187],
     [257, 258, 256], [278, 279, 280], [281, 282, 283]],
    [[ 81,  82,  80], [ 83,  84,  85], [ 92,  93,  94],
     [177, 178, 176], [179, 180, 181], [188, 189, 190],
     [273, 274, 272], [275, 276, 277], [284, 285, 286]],
];

/// Blue, green and red channels of column `(x, z)`
///
/// `x` and `z` must be inside the cube.
#[inline]
pub fn channels(x: usize, z: usize) -> [u16; 3] {
    LED_CHANNELS[DEPTH - 1 - z][x]
}

/// Physical channel of one primary of column `(x, z)`
///
/// Returns `None` outside the cube.
pub fn channel(x: usize, z: usize, primary: Primary) -> Option<u16> {
    if x >= WIDTH || z >= DEPTH {
        return None;
    }
    let [b, g, r] = channels(x, z);
    Some(match primary {
        Primary::Red => r,
        Primary::Green => g,
        Primary::Blue => b,
    })
}
