//! Symbol construction: codeword packing, error correction interleaving, module placement
//! and masking.

use tracing::{debug, trace};

use crate::bit_buffer::{get_bit, BitBuffer};
use crate::config::EncodeOptions;
use crate::error::{QrError, Result};
use crate::mask::Mask;
use crate::reed_solomon::ReedSolomonGenerator;
use crate::segment::QrSegment;
use crate::version::{select_version, EcLevel, Selection, Version};

/// A QR Code symbol, a square grid of dark and light modules.
///
/// Covers QR Code Model 2: versions 1 to 40, all four error correction levels and the
/// numeric, alphanumeric, byte and ECI segment modes. Instances are immutable.
///
/// # Creation
///
/// - High-level: [`QrCode::encode_text`] or [`QrCode::encode_binary`].
/// - Mid-level: [`QrCode::encode_segments`] or [`QrCode::encode_segments_advanced`].
/// - Low-level: [`QrCode::encode_codewords`] with ready-made data codewords.
///
/// # Example
///
/// ```rust
/// use qrenc::{EcLevel, QrCode};
///
/// let qr = QrCode::encode_text("HELLO WORLD", EcLevel::Quartile).unwrap();
/// assert_eq!(qr.version().value(), 1);
/// assert_eq!(qr.size(), 21);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QrCode {
    version: Version,
    size: usize,
    ecl: EcLevel,
    mask: Mask,
    // Row-major, true = dark
    modules: Vec<bool>,
}

impl QrCode {
    /// Encodes Unicode text at the given minimum error correction level, choosing the
    /// smallest version that fits and boosting the level when free.
    pub fn encode_text(text: &str, ecl: EcLevel) -> Result<Self> {
        let segs = QrSegment::make_segments(text);
        Self::encode_segments(&segs, ecl)
    }

    /// Encodes arbitrary bytes as a single byte-mode segment.
    pub fn encode_binary(data: &[u8], ecl: EcLevel) -> Result<Self> {
        let segs = [QrSegment::make_bytes(data)];
        Self::encode_segments(&segs, ecl)
    }

    pub fn encode_segments(segs: &[QrSegment], ecl: EcLevel) -> Result<Self> {
        Self::encode_segments_advanced(segs, &EncodeOptions::with_ecl(ecl))
    }

    /// Encodes the segments with full control over the version range, mask and
    /// level boosting.
    ///
    /// Fails with [`QrError::DataTooLong`] when the data does not fit in
    /// `options.max_version`, including when a character count overflows its field.
    pub fn encode_segments_advanced(segs: &[QrSegment], options: &EncodeOptions) -> Result<Self> {
        options.validate()?;
        let selection = select_version(
            segs,
            options.ecl,
            options.min_version,
            options.max_version,
            options.boost_ecl,
        )?;
        let datacodewords = pack_data_codewords(segs, &selection)?;
        Ok(MatrixBuilder::new(selection.version, selection.ecl).build(&datacodewords, options.mask))
    }

    /// Builds a symbol from data codewords that already include terminator and padding.
    ///
    /// `datacodewords` must hold exactly `version.data_codewords(ecl)` bytes.
    pub fn encode_codewords(
        version: Version,
        ecl: EcLevel,
        datacodewords: &[u8],
        mask: Option<Mask>,
    ) -> Result<Self> {
        let expected = version.data_codewords(ecl);
        if datacodewords.len() != expected {
            return Err(QrError::invalid(format!(
                "expected {} data codewords, got {}",
                expected,
                datacodewords.len()
            )));
        }
        Ok(MatrixBuilder::new(version, ecl).build(datacodewords, mask))
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the error correction level actually used, which may be higher than requested.
    pub fn error_correction_level(&self) -> EcLevel {
        self.ecl
    }

    /// Returns the mask pattern applied to the data modules, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the color of the module at the given coordinates: `true` for dark,
    /// `false` for light. Coordinates outside the symbol are light, which makes
    /// drawing a quiet zone straightforward.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size as i32;
        range.contains(&x) && range.contains(&y) && self.modules[y as usize * self.size + x as usize]
    }

    /// All modules in row-major order.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Iterates over the rows from top to bottom, each `size` modules long.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.modules.chunks(self.size)
    }
}

/// Concatenates the segments into data codewords: mode indicators, count fields and
/// payloads, then a terminator, zero bits to a byte boundary and alternating pad bytes.
fn pack_data_codewords(segs: &[QrSegment], selection: &Selection) -> Result<Vec<u8>> {
    let version = selection.version;
    let mut bb = BitBuffer::new();
    for seg in segs {
        bb.append_bits(seg.mode().mode_bits(), 4)?;
        // Selection already checked the count against its field width
        bb.append_bits(seg.num_chars() as u32, seg.mode().num_char_count_bits(version))?;
        bb.append_buffer(seg.data());
    }
    assert_eq!(
        bb.len(),
        selection.data_bits,
        "invariant violated: packed bits disagree with selected size"
    );

    let capacity = version.data_capacity_bits(selection.ecl);
    let terminator = (capacity - bb.len()).min(4);
    bb.append_bits(0, terminator as u8)?;
    let align = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, align as u8)?;
    for &padbyte in [0xec, 0x11].iter().cycle() {
        if bb.len() >= capacity {
            break;
        }
        bb.append_bits(padbyte, 8)?;
    }
    Ok(bb.to_bytes())
}

/// Splits data codewords into blocks, appends each block's Reed-Solomon remainder and
/// interleaves the result byte by byte.
fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: EcLevel) -> Vec<u8> {
    assert_eq!(
        data.len(),
        ver.data_codewords(ecl),
        "invariant violated: data codeword count"
    );
    let numblocks = ver.num_blocks(ecl);
    let blockecclen = ver.ecc_codewords_per_block(ecl);
    let rawcodewords = ver.raw_codewords();
    let numshortblocks = numblocks - rawcodewords % numblocks;
    let shortblocklen = rawcodewords / numblocks;
    let shortdatalen = shortblocklen - blockecclen;

    // Every block is padded to the long length; short blocks carry a hole at `shortdatalen`
    let rs = ReedSolomonGenerator::for_block(blockecclen);
    let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(numblocks);
    let mut rest = data;
    for i in 0..numblocks {
        let datlen = shortdatalen + usize::from(i >= numshortblocks);
        let (dat, tail) = rest.split_at(datlen);
        rest = tail;
        let mut block = Vec::with_capacity(shortblocklen + 1);
        block.extend_from_slice(dat);
        if i < numshortblocks {
            block.push(0);
        }
        block.extend(rs.compute_remainder(dat));
        blocks.push(block);
    }
    debug_assert!(rest.is_empty());

    let mut result = Vec::with_capacity(rawcodewords);
    for i in 0..=shortblocklen {
        for (j, block) in blocks.iter().enumerate() {
            if i != shortdatalen || j >= numshortblocks {
                result.push(block[i]);
            }
        }
    }
    debug_assert_eq!(result.len(), rawcodewords);
    result
}

/// 15-bit format information: level and mask, BCH(15,5) protected and XOR-masked.
fn format_bits(ecl: EcLevel, mask: Mask) -> u32 {
    let data = u32::from(ecl.format_bits() << 3 | mask.value());
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    ((data << 10) | rem) ^ 0x5412
}

/// 18-bit version information, BCH(18,6) protected. Only drawn from version 7 up.
fn version_bits(ver: Version) -> u32 {
    let data = u32::from(ver.value());
    let mut rem = data;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
    }
    (data << 12) | rem
}

/// Working state while a symbol is drawn. The function-module map lives only here and
/// is dropped when [`MatrixBuilder::build`] hands back the finished [`QrCode`].
struct MatrixBuilder {
    version: Version,
    ecl: EcLevel,
    size: usize,
    modules: Vec<bool>,
    isfunction: Vec<bool>,
}

impl MatrixBuilder {
    fn new(version: Version, ecl: EcLevel) -> Self {
        let size = version.size();
        let mut result = Self {
            version,
            ecl,
            size,
            modules: vec![false; size * size],
            isfunction: vec![false; size * size],
        };
        result.draw_function_patterns();
        result
    }

    fn build(mut self, datacodewords: &[u8], mask: Option<Mask>) -> QrCode {
        let allcodewords = add_ecc_and_interleave(datacodewords, self.version, self.ecl);
        self.draw_codewords(&allcodewords);

        let mask = match mask {
            Some(m) => m,
            None => self.choose_mask(),
        };
        self.apply_mask(mask);
        self.draw_format_bits(mask);
        QrCode {
            version: self.version,
            size: self.size,
            ecl: self.ecl,
            mask,
            modules: self.modules,
        }
    }

    fn module(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.size + x]
    }

    fn set_function_module(&mut self, x: usize, y: usize, isdark: bool) {
        let index = y * self.size + x;
        self.modules[index] = isdark;
        self.isfunction[index] = true;
    }

    fn draw_function_patterns(&mut self) {
        let size = self.size;
        for i in 0..size {
            self.set_function_module(6, i, i % 2 == 0);
            self.set_function_module(i, 6, i % 2 == 0);
        }

        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(size - 4, 3);
        self.draw_finder_pattern(3, size - 4);

        // Every grid position except the three finder corners
        let positions = self.version.alignment_pattern_positions();
        let last = positions.len().saturating_sub(1);
        for (i, &x) in positions.iter().enumerate() {
            for (j, &y) in positions.iter().enumerate() {
                let corner = (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0);
                if !corner {
                    self.draw_alignment_pattern(x, y);
                }
            }
        }

        // Placeholder until a mask is chosen
        self.draw_format_bits(Mask::Pattern0);
        self.draw_version();
    }

    fn draw_format_bits(&mut self, mask: Mask) {
        let bits = format_bits(self.ecl, mask);
        let size = self.size;

        // First copy, around the top-left finder
        for i in 0..6 {
            self.set_function_module(8, i, get_bit(bits, i as u8));
        }
        self.set_function_module(8, 7, get_bit(bits, 6));
        self.set_function_module(8, 8, get_bit(bits, 7));
        self.set_function_module(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, get_bit(bits, i as u8));
        }

        // Second copy, split between the other two finders
        for i in 0..8 {
            self.set_function_module(size - 1 - i, 8, get_bit(bits, i as u8));
        }
        for i in 8..15 {
            self.set_function_module(8, size - 15 + i, get_bit(bits, i as u8));
        }
        self.set_function_module(8, size - 8, true); // Always dark
    }

    fn draw_version(&mut self) {
        if self.version.value() < 7 {
            return;
        }
        let bits = version_bits(self.version);
        for i in 0..18usize {
            let bit = get_bit(bits, i as u8);
            let a = self.size - 11 + i % 3;
            let b = i / 3;
            self.set_function_module(a, b, bit);
            self.set_function_module(b, a, bit);
        }
    }

    /// 9x9 finder (with separator) centred at (x, y); parts outside the symbol are clipped.
    fn draw_finder_pattern(&mut self, x: usize, y: usize) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let dist = dx.abs().max(dy.abs());
                let xx = x as i32 + dx;
                let yy = y as i32 + dy;
                let range = 0..self.size as i32;
                if range.contains(&xx) && range.contains(&yy) {
                    self.set_function_module(xx as usize, yy as usize, dist != 2 && dist != 4);
                }
            }
        }
    }

    /// 5x5 alignment pattern centred at (x, y).
    fn draw_alignment_pattern(&mut self, x: usize, y: usize) {
        for dy in 0..5usize {
            for dx in 0..5usize {
                let ring = dx.abs_diff(2).max(dy.abs_diff(2));
                self.set_function_module(x + dx - 2, y + dy - 2, ring != 1);
            }
        }
    }

    /// Places codeword bits in the zig-zag column-pair order, skipping function modules.
    fn draw_codewords(&mut self, data: &[u8]) {
        assert_eq!(
            data.len(),
            self.version.raw_codewords(),
            "invariant violated: codeword stream length"
        );
        let size = self.size;
        let totalbits = data.len() * 8;
        let mut i = 0usize;
        let mut right = size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            let upward = (right + 1) & 2 == 0;
            for vert in 0..size {
                let y = if upward { size - 1 - vert } else { vert };
                for j in 0..2 {
                    let x = right - j;
                    let index = y * size + x;
                    if !self.isfunction[index] && i < totalbits {
                        self.modules[index] = get_bit(u32::from(data[i >> 3]), 7 - (i & 7) as u8);
                        i += 1;
                    }
                    // Remainder bits stay light
                }
            }
            if right < 2 {
                break;
            }
            right -= 2;
        }
        debug_assert_eq!(i, totalbits);
    }

    /// XORs the mask over every non-function module. Applying twice is a no-op.
    fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                let index = y * self.size + x;
                if !self.isfunction[index] && mask.is_masked(x, y) {
                    self.modules[index] ^= true;
                }
            }
        }
    }

    fn choose_mask(&mut self) -> Mask {
        let mut best = Mask::Pattern0;
        let mut minpenalty = i32::MAX;
        for mask in Mask::ALL {
            self.apply_mask(mask);
            self.draw_format_bits(mask);
            let penalty = self.penalty_score();
            trace!(mask = mask.value(), penalty, "mask penalty");
            if penalty < minpenalty {
                best = mask;
                minpenalty = penalty;
            }
            self.apply_mask(mask); // Undoes the mask due to XOR
        }
        debug!(mask = best.value(), penalty = minpenalty, "selected mask");
        best
    }

    fn penalty_score(&self) -> i32 {
        let size = self.size;
        let mut result: i32 = 0;

        for y in 0..size {
            result += line_penalty(size, (0..size).map(|x| self.module(x, y)));
        }
        for x in 0..size {
            result += line_penalty(size, (0..size).map(|y| self.module(x, y)));
        }

        // 2x2 blocks of one color
        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let color = self.module(x, y);
                if color == self.module(x + 1, y)
                    && color == self.module(x, y + 1)
                    && color == self.module(x + 1, y + 1)
                {
                    result += PENALTY_N2;
                }
            }
        }

        // Dark/light balance, in 5% steps away from 50%
        let dark = self.modules.iter().filter(|&&m| m).count() as i32;
        let total = (size * size) as i32;
        let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
        result += k.max(0) * PENALTY_N4;
        result
    }
}

/// Run-length and finder-lookalike penalties for one row or column.
fn line_penalty(size: usize, line: impl Iterator<Item = bool>) -> i32 {
    let mut result: i32 = 0;
    let mut runcolor = false;
    let mut runlen: i32 = 0;
    let mut history = FinderPenalty::new(size);
    for color in line {
        if color == runcolor {
            runlen += 1;
            if runlen == 5 {
                result += PENALTY_N1;
            } else if runlen > 5 {
                result += 1;
            }
        } else {
            history.add_history(runlen);
            if !runcolor {
                result += history.count_patterns() * PENALTY_N3;
            }
            runcolor = color;
            runlen = 1;
        }
    }
    result + history.terminate_and_count(runcolor, runlen) * PENALTY_N3
}

/// Sliding window over the last 7 run lengths of a line, newest first. The line is
/// treated as bordered by light modules the width of the symbol.
struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: usize) -> Self {
        Self {
            qr_size: size as i32,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.qr_size; // Light border before the first run
        }
        self.run_history.copy_within(0..6, 1);
        self.run_history[0] = currentrunlength;
    }

    /// Counts dark 1:1:3:1:1 cores with a light run of at least 4 units on one side
    /// and 1 unit on the other. Each side is counted separately.
    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        i32::from(core && rh[0] >= n * 4 && rh[6] >= n)
            + i32::from(core && rh[6] >= n * 4 && rh[0] >= n)
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.qr_size; // Light border after the last run
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: u8) -> Version {
        Version::new(n).unwrap()
    }

    #[test]
    fn test_format_bits() {
        assert_eq!(format_bits(EcLevel::Low, Mask::Pattern0), 0b111011111000100);
        assert_eq!(format_bits(EcLevel::Quartile, Mask::Pattern2), 0b011111100110001);
        assert_eq!(format_bits(EcLevel::Medium, Mask::Pattern5), 0x40ce);
    }

    #[test]
    fn test_version_bits() {
        assert_eq!(version_bits(v(7)), 0x07c94);
        assert_eq!(version_bits(v(40)), 0x28c69);
    }

    #[test]
    fn test_pack_pads_to_capacity() {
        let segs = QrSegment::make_segments("HELLO WORLD");
        let selection = select_version(&segs, EcLevel::Quartile, v(1), v(1), false).unwrap();
        let data = pack_data_codewords(&segs, &selection).unwrap();
        assert_eq!(data, vec![32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236]);
    }

    #[test]
    fn test_interleave_single_block() {
        let data = [32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236];
        let all = add_ecc_and_interleave(&data, v(1), EcLevel::Quartile);
        assert_eq!(&all[..13], &data);
        assert_eq!(&all[13..], &[168, 72, 22, 82, 217, 54, 156, 0, 46, 15, 180, 122, 16]);
    }

    #[test]
    fn test_interleave_uneven_blocks() {
        // 5-Q: two blocks of 15 data codewords, two of 16
        let ver = v(5);
        let data: Vec<u8> = (0..ver.data_codewords(EcLevel::Quartile) as u8).collect();
        assert_eq!(data.len(), 62);
        let all = add_ecc_and_interleave(&data, ver, EcLevel::Quartile);
        assert_eq!(all.len(), ver.raw_codewords());
        assert_eq!(&all[..8], &[0, 15, 30, 46, 1, 16, 31, 47]);
        // Final data column holds only the two long blocks
        assert_eq!(&all[60..62], &[45, 61]);
    }

    #[test]
    #[should_panic(expected = "invariant violated")]
    fn test_interleave_rejects_wrong_length() {
        add_ecc_and_interleave(&[0u8; 12], v(1), EcLevel::Quartile);
    }

    #[test]
    fn test_encode_codewords_rejects_wrong_length() {
        let err = QrCode::encode_codewords(v(1), EcLevel::Low, &[0u8; 3], None).unwrap_err();
        assert!(matches!(err, QrError::InvalidArgument(_)));
    }

    #[test]
    fn test_mask_is_self_inverse() {
        let mut builder = MatrixBuilder::new(v(2), EcLevel::Low);
        let data = vec![0xa5u8; v(2).data_codewords(EcLevel::Low)];
        builder.draw_codewords(&add_ecc_and_interleave(&data, v(2), EcLevel::Low));
        let before = builder.modules.clone();
        for mask in Mask::ALL {
            builder.apply_mask(mask);
            builder.apply_mask(mask);
            assert_eq!(builder.modules, before);
        }
    }

    #[test]
    fn test_function_module_count() {
        for n in [1u8, 2, 6, 7, 14, 40] {
            let ver = v(n);
            let builder = MatrixBuilder::new(ver, EcLevel::Medium);
            let free = builder.isfunction.iter().filter(|&&f| !f).count();
            assert_eq!(free, ver.raw_data_modules(), "version {}", n);
        }
    }

    #[test]
    fn test_alignment_pattern_rings() {
        // Version 7 centres: 6, 22, 38
        let builder = MatrixBuilder::new(v(7), EcLevel::Low);
        for (cx, cy) in [(22usize, 22usize), (38, 38), (22, 6), (6, 22)] {
            for dy in 0..5usize {
                for dx in 0..5usize {
                    let (x, y) = (cx + dx - 2, cy + dy - 2);
                    let ring = dx.abs_diff(2).max(dy.abs_diff(2));
                    assert_eq!(builder.module(x, y), ring != 1, "({}, {})", x, y);
                    assert!(builder.isfunction[y * builder.size + x]);
                }
            }
        }
    }

    #[test]
    fn test_finder_penalty_window() {
        let mut fp = FinderPenalty::new(21);
        // light border, then dark 1, light 1, dark 3, light 1, dark 1, then light 4
        for run in [0, 1, 1, 3, 1, 1] {
            fp.add_history(run);
        }
        assert_eq!(fp.terminate_and_count(false, 4), 2);
    }
}
