pub use encode::*;

// Encoder
//------------------------------------------------------------------------------

pub mod encode {
    use tracing::debug;

    use super::writer::{pad_remaining_capacity, push_segment, push_terminator};
    use crate::common::bit_utils::BitStream;
    use crate::common::codec::{to_kanji, Mode, Segment, ECI_UTF8};
    use crate::common::error::{BarcodeError, BarcodeResult};
    use crate::common::metadata::{ECLevel, Version};

    /// Input data split into the parts written to the symbol, independent of
    /// the version.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Payload {
        mode: Mode,
        parts: Vec<(Mode, Vec<u8>)>,
    }

    impl Payload {
        pub fn new(data: &[u8], mode: Option<Mode>, eci: bool) -> BarcodeResult<Self> {
            if data.is_empty() {
                return Err(BarcodeError::EmptyData);
            }

            let mode = match mode {
                Some(m) => m,
                None => find_mode(data),
            };
            let bytes = match mode {
                Mode::Numeric | Mode::Alphanumeric => {
                    if !data.iter().all(|b| mode.contains(*b)) {
                        return Err(BarcodeError::UnsupportedMode(mode.name()));
                    }
                    data.to_vec()
                }
                Mode::Kanji => to_kanji(data).ok_or(BarcodeError::UnsupportedMode("kanji"))?,
                Mode::Byte => data.to_vec(),
                Mode::Eci => return Err(BarcodeError::UnsupportedMode("eci")),
            };

            let mut parts = Vec::with_capacity(2);
            if eci && mode == Mode::Byte && !data.is_ascii() {
                parts.push((Mode::Eci, vec![ECI_UTF8]));
            }
            parts.push((mode, bytes));
            Ok(Self { mode, parts })
        }

        pub fn mode(&self) -> Mode {
            self.mode
        }

        pub fn segments(&self, ver: Version) -> Option<Vec<Segment>> {
            self.parts.iter().map(|(m, d)| Segment::for_version(ver, *m, d.clone())).collect()
        }

        pub fn bit_len(&self, ver: Version) -> Option<usize> {
            self.segments(ver).map(|segs| segs.iter().map(|s| s.bit_len()).sum())
        }
    }

    // Smallest superset: numeric, alphanumeric, kanji, byte
    fn find_mode(data: &[u8]) -> Mode {
        if data.iter().all(|b| Mode::Numeric.contains(*b)) {
            Mode::Numeric
        } else if data.iter().all(|b| Mode::Alphanumeric.contains(*b)) {
            Mode::Alphanumeric
        } else if to_kanji(data).is_some() {
            Mode::Kanji
        } else {
            Mode::Byte
        }
    }

    pub fn encode(payload: &Payload, ecl: ECLevel, micro: bool) -> BarcodeResult<(BitStream, Version)> {
        let ver = find_optimal_version(payload, ecl, micro)?;
        let bs = encode_with_version(payload, ver, ecl)?;
        Ok((bs, ver))
    }

    pub fn encode_with_version(
        payload: &Payload,
        ver: Version,
        ecl: ECLevel,
    ) -> BarcodeResult<BitStream> {
        if !ver.supports(ecl) {
            return Err(BarcodeError::UnsupportedErrorLevel(ecl.to_string(), ver.to_string()));
        }
        let segs = payload.segments(ver).ok_or_else(|| BarcodeError::ModeNotInVersion {
            mode: payload.mode.name(),
            version: ver.to_string(),
        })?;

        let bcap = ver.data_bit_capacity(ecl);
        let sz: usize = segs.iter().map(|s| s.bit_len()).sum();
        if sz > bcap {
            return Err(BarcodeError::CapacityExceeded { needed: sz, capacity: bcap });
        }

        let mut bs = BitStream::new(bcap);
        for seg in segs {
            push_segment(&seg, &mut bs);
        }
        push_terminator(ver, &mut bs);
        pad_remaining_capacity(&mut bs);
        Ok(bs)
    }

    pub fn find_optimal_version(
        payload: &Payload,
        ecl: ECLevel,
        micro: bool,
    ) -> BarcodeResult<Version> {
        let mut needed = 0;
        let mut capacity = 0;
        let mut supported = false;
        for ver in Version::all(micro) {
            if !ver.supports(ecl) {
                continue;
            }
            supported = true;
            let Some(sz) = payload.bit_len(ver) else {
                continue;
            };
            let bcap = ver.data_bit_capacity(ecl);
            debug!("Version {ver}: {sz} bits needed, {bcap} bits available");
            if sz <= bcap {
                return Ok(ver);
            }
            needed = sz;
            capacity = bcap;
        }

        if !supported {
            let kind = if micro { "Micro QR" } else { "QR" };
            return Err(BarcodeError::UnsupportedErrorLevel(ecl.to_string(), kind.to_string()));
        }
        if needed == 0 {
            let kind = if micro { "M4" } else { "40" };
            return Err(BarcodeError::ModeNotInVersion {
                mode: payload.mode.name(),
                version: kind.to_string(),
            });
        }
        Err(BarcodeError::CapacityExceeded { needed, capacity })
    }

    /// Highest error correction level at or above `ecl` that still fits `ver`.
    pub fn boost_error_level(payload: &Payload, ver: Version, ecl: ECLevel) -> ECLevel {
        let Some(sz) = payload.bit_len(ver) else {
            return ecl;
        };
        ECLevel::ALL
            .into_iter()
            .filter(|l| *l >= ecl && ver.supports(*l) && sz <= ver.data_bit_capacity(*l))
            .max()
            .unwrap_or(ecl)
    }

}

// Writer for encoded data
//------------------------------------------------------------------------------

pub(super) mod writer {
    use crate::common::bit_utils::BitStream;
    use crate::common::codec::{Mode, Segment, PADDING_CODEWORDS};
    use crate::common::metadata::Version;

    pub fn push_segment(seg: &Segment, out: &mut BitStream) {
        push_header(seg, out);
        match seg.mode {
            Mode::Numeric => push_numeric_data(&seg.data, out),
            Mode::Alphanumeric => push_alphanumeric_data(&seg.data, out),
            Mode::Byte | Mode::Eci => push_byte_data(&seg.data, out),
            Mode::Kanji => push_kanji_data(&seg.data, out),
        }
    }

    fn push_header(seg: &Segment, out: &mut BitStream) {
        out.push_bits(seg.indicator, seg.mode_bits);
        let char_cnt = seg.char_count();
        if seg.len_bits > 0 {
            debug_assert!(
                char_cnt < (1 << seg.len_bits),
                "Char count exceeds bit length: Char count {char_cnt}, Char count bits {}",
                seg.len_bits
            );
            out.push_bits(char_cnt as u16, seg.len_bits);
        }
    }

    fn push_numeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(3) {
            let len = (chunk.len() * 10 + 2) / 3;
            let data = Mode::Numeric.encode_chunk(chunk);
            out.push_bits(data, len);
        }
    }

    fn push_alphanumeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(2) {
            let len = (chunk.len() * 11 + 1) / 2;
            let data = Mode::Alphanumeric.encode_chunk(chunk);
            out.push_bits(data, len);
        }
    }

    fn push_byte_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(1) {
            let data = Mode::Byte.encode_chunk(chunk);
            out.push_bits(data, 8);
        }
    }

    fn push_kanji_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(2) {
            let data = Mode::Kanji.encode_chunk(chunk);
            out.push_bits(data, 13);
        }
    }

    pub fn push_terminator(ver: Version, out: &mut BitStream) {
        let term_len = std::cmp::min(ver.terminator_bits(), out.remaining());
        out.push_bits(0_u16, term_len);
    }

    pub fn pad_remaining_capacity(out: &mut BitStream) {
        push_padding_bits(out);
        push_padding_codewords(out);
    }

    fn push_padding_bits(out: &mut BitStream) {
        let offset = out.len() & 7;
        if offset > 0 {
            let padding_bits_len = std::cmp::min(8 - offset, out.remaining());
            out.push_bits(0_u8, padding_bits_len);
        }
    }

    // Micro QR M1 and M3 end on a 4 bit codeword which is left as zeros
    fn push_padding_codewords(out: &mut BitStream) {
        let remain_byte_capacity = out.remaining() >> 3;
        PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
            out.push_bits(pc, 8);
        });
        let rest = out.remaining();
        out.push_bits(0_u8, rest);
    }

    #[cfg(test)]
    mod writer_tests {
        use super::{
            push_alphanumeric_data, push_byte_data, push_header, push_kanji_data,
            push_numeric_data, push_padding_bits, push_padding_codewords, push_terminator,
        };
        use crate::common::bit_utils::BitStream;
        use crate::common::codec::{Mode, Segment, PADDING_CODEWORDS};
        use crate::common::metadata::{ECLevel, Version};

        #[test]
        fn test_push_header_v1() {
            let ver = Version::Normal(1);
            let bit_capacity = ver.data_bit_capacity(ECLevel::L);
            let exp_vecs: Vec<Vec<u8>> = vec![
                vec![0b00011111, 0b11111100],
                vec![0b00101111, 0b11111000],
                vec![0b01001111, 0b11110000],
            ];
            let modes = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte];
            let dummy_idx = [1023, 511, 255];
            for ((mode, di), exp_vec) in modes.iter().zip(dummy_idx.iter()).zip(exp_vecs.iter()) {
                let mut bs = BitStream::new(bit_capacity);
                let seg = Segment::for_version(ver, *mode, vec![0; *di]).unwrap();
                push_header(&seg, &mut bs);
                assert_eq!(bs.data(), exp_vec);
            }
        }

        #[test]
        fn test_push_header_micro() {
            let mut bs = BitStream::new(84);
            let seg = Segment::for_version(Version::Micro(3), Mode::Byte, vec![0; 5]).unwrap();
            push_header(&seg, &mut bs);
            // Indicator 10, count 0101
            assert_eq!(bs.len(), 6);
            assert_eq!(bs.data(), [0b10010100]);
        }

        #[test]
        fn test_push_numeric_data() {
            let mut bs = BitStream::new(64);
            push_numeric_data(b"01234567", &mut bs);
            assert_eq!(bs.len(), 27);
            assert_eq!(bs.data(), [0b00000011, 0b00010101, 0b10011000, 0b01100000]);
        }

        #[test]
        fn test_push_alphanumeric_data() {
            let mut bs = BitStream::new(64);
            push_alphanumeric_data(b"AC-42", &mut bs);
            assert_eq!(bs.len(), 28);
            assert_eq!(bs.data(), [0b00111001, 0b11011100, 0b11100100, 0b00100000]);
        }

        #[test]
        fn test_push_byte_data() {
            let mut bs = BitStream::new(64);
            push_byte_data(b"a\n\t", &mut bs);
            assert_eq!(bs.data(), b"a\n\t");
        }

        #[test]
        fn test_push_kanji_data() {
            let mut bs = BitStream::new(32);
            push_kanji_data(&[0x93, 0x5F, 0xE4, 0xAA], &mut bs);
            assert_eq!(bs.len(), 26);
            assert_eq!(bs.data(), [0b01101100, 0b11111110, 0b10101010, 0b10000000]);
        }

        #[test]
        fn test_push_terminator() {
            let mut bs = BitStream::new(10);
            bs.push_bits(0b1111111_u8, 7);
            push_terminator(Version::Normal(1), &mut bs);
            assert_eq!(bs.len(), 10);

            let mut bs = BitStream::new(40);
            push_terminator(Version::Micro(4), &mut bs);
            assert_eq!(bs.len(), 9);
        }

        #[test]
        fn test_push_padding_bits() {
            let mut bs = BitStream::new(16);
            bs.push_bits(0b101_u8, 3);
            push_padding_bits(&mut bs);
            assert_eq!(bs.len(), 8);
            assert_eq!(bs.data(), [0b10100000]);
        }

        #[test]
        fn test_push_padding_codewords() {
            let mut bs = BitStream::new(48);
            bs.push_bits(0xFF_u8, 8);
            push_padding_codewords(&mut bs);
            let mut exp = vec![0xFF];
            exp.extend(PADDING_CODEWORDS.iter().cycle().take(5));
            assert_eq!(bs.data(), exp);
        }

        #[test]
        fn test_push_padding_codewords_half() {
            // M3-M holds 8 full codewords and a trailing 4 bit one
            let mut bs = BitStream::new(68);
            bs.push_bits(0xFF_u8, 8);
            push_padding_codewords(&mut bs);
            assert_eq!(bs.len(), 68);
            assert_eq!(bs.data()[8], 0);
            assert_eq!(bs.data()[7], PADDING_CODEWORDS[0]);
        }
    }
}
