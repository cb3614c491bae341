mod qr;

pub use qr::QR;

use std::ops::Deref;

use tracing::debug;

use crate::common::{
    bit_utils::BitStream,
    codec::{boost_error_level, encode, encode_with_version, Mode, Payload},
    ec::ecc,
    error::BarcodeResult,
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
};

pub struct QRBuilder<'a> {
    data: &'a [u8],
    micro: bool,
    version: Option<Version>,
    ec_level: ECLevel,
    boost_error: bool,
    mask: Option<MaskPattern>,
    mode: Option<Mode>,
    eci: bool,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            micro: false,
            version: None,
            ec_level: ECLevel::L,
            boost_error: true,
            mask: None,
            mode: None,
            eci: false,
        }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = data;
        self
    }

    /// Searches Micro QR versions when no explicit version is set.
    pub fn micro(&mut self, micro: bool) -> &mut Self {
        self.micro = micro;
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    /// Minimum error correction level, raised when `boost_error` is on and
    /// the data still fits.
    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn boost_error(&mut self, boost_error: bool) -> &mut Self {
        self.boost_error = boost_error;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = Some(mode);
        self
    }

    pub fn eci(&mut self, eci: bool) -> &mut Self {
        self.eci = eci;
        self
    }

    pub fn metadata(&self) -> String {
        let version = match self.version {
            Some(v) => v.to_string(),
            None if self.micro => "Micro".to_string(),
            None => "None".to_string(),
        };
        format!(
            "{{ Version: {version}, Ec level: {:?}, Boost: {}, Mode: {} }}",
            self.ec_level,
            self.boost_error,
            self.mode.map_or("auto", |m| m.name())
        )
    }
}

#[cfg(test)]
mod qrbuilder_util_tests {
    use super::QRBuilder;
    use crate::common::{ECLevel, Mode, Version};

    #[test]
    fn test_metadata() {
        let data = "Hello, world!".as_bytes();
        let mut qr_builder = QRBuilder::new(data);
        qr_builder.version(Version::Normal(1)).ec_level(ECLevel::L).boost_error(false);
        assert_eq!(
            qr_builder.metadata(),
            "{ Version: 1, Ec level: L, Boost: false, Mode: auto }"
        );
        qr_builder.unset_version().micro(true).mode(Mode::Byte);
        assert_eq!(
            qr_builder.metadata(),
            "{ Version: Micro, Ec level: L, Boost: false, Mode: byte }"
        );
    }
}

impl QRBuilder<'_> {
    pub fn build(&self) -> BarcodeResult<QR> {
        debug!("Generating QR {}", self.metadata());
        let payload = Payload::new(self.data, self.mode, self.eci)?;

        // Encode data optimally
        debug!("Encoding data in {} mode", payload.mode());
        let (mut encoded_data, version) = match self.version {
            Some(v) => (encode_with_version(&payload, v, self.ec_level)?, v),
            None => {
                debug!("Finding best version...");
                encode(&payload, self.ec_level, self.micro)?
            }
        };

        let ec_level = if self.boost_error {
            boost_error_level(&payload, version, self.ec_level)
        } else {
            self.ec_level
        };
        if ec_level != self.ec_level {
            debug!("Boosting error correction from {} to {ec_level}", self.ec_level);
            encoded_data = encode_with_version(&payload, version, ec_level)?;
        }

        let mask = self.mask.map(|m| m.validate(version)).transpose()?;

        debug!("Constructing payload with ecc & interleaving...");
        let payload = Self::build_payload(&encoded_data, version, ec_level);

        debug!("Constructing QR {version}-{ec_level}...");
        let mut qr = QR::new(version, ec_level);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(payload);

        let mask = match mask {
            Some(m) => {
                debug!("Applying mask {}...", *m);
                qr.apply_mask(m);
                m
            }
            None => {
                debug!("Finding & applying best mask...");
                apply_best_mask(&mut qr)
            }
        };

        let total_modules = qr.width() * qr.width();
        let dark_modules = qr.count_dark_modules();
        debug!(
            "QR generated: version {version}, ec level {ec_level}, mask {}, data {} of {} bits, dark {}%",
            *mask,
            encoded_data.len(),
            version.data_bit_capacity(ec_level),
            dark_modules * 100 / total_modules
        );

        Ok(qr)
    }

    // Data codewords of every block interleaved, followed by the ecc
    // codewords interleaved the same way. Micro QR M1 and M3 keep only the
    // high nibble of their last data codeword.
    fn build_payload(encoded_data: &BitStream, version: Version, ec_level: ECLevel) -> BitStream {
        let (data_blocks, ecc_blocks) = ecc(encoded_data.data(), version, ec_level);

        let data_bits = version.data_bit_capacity(ec_level);
        let ecc_bits = version.ecc_per_block(ec_level) * version.block_count(ec_level) * 8;
        let mut payload = BitStream::new(data_bits + ecc_bits);

        let data = Self::interleave(&data_blocks);
        if data_bits & 7 == 0 {
            payload.extend(&data);
        } else if let Some((last, full)) = data.split_last() {
            payload.extend(full);
            payload.push_bits(*last >> 4, 4);
        }
        payload.extend(&Self::interleave(&ecc_blocks));
        payload
    }

    pub fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
        let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
        let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
        let mut res = Vec::with_capacity(total_size);
        for i in 0..max_block_size {
            for b in blocks {
                if i < b.len() {
                    res.push(b[i]);
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod builder_tests {
    use test_case::test_case;

    use super::QRBuilder;
    use crate::common::{BarcodeError, ECLevel, MaskPattern, Mode, Version};

    #[test]
    fn test_interleave() {
        let blocks = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 0]];
        let interleaved = QRBuilder::interleave(&blocks);
        let exp_interleaved = vec![1, 4, 7, 2, 5, 8, 3, 6, 9, 0];
        assert_eq!(interleaved, exp_interleaved);
    }

    #[test]
    fn test_hello_world_layout() {
        let qr = QRBuilder::new(b"HELLO WORLD")
            .ec_level(ECLevel::M)
            .boost_error(false)
            .mask(MaskPattern::new(4).unwrap())
            .build()
            .unwrap();
        assert_eq!(qr.version(), Version::Normal(1));
        assert_eq!(qr.ec_level(), ECLevel::M);
        assert_eq!(*qr.mask().unwrap(), 4);
    }

    #[test_case(b"1", Version::Micro(1), ECLevel::L)]
    #[test_case(b"12345", Version::Micro(2), ECLevel::M)]
    #[test_case(b"HELLO", Version::Micro(2), ECLevel::L)]
    #[test_case(b"hello", Version::Micro(3), ECLevel::M)]
    #[test_case(b"1234567890", Version::Micro(4), ECLevel::Q)]
    fn test_micro_build(data: &[u8], version: Version, ec_level: ECLevel) {
        let qr = QRBuilder::new(data).version(version).ec_level(ec_level).build().unwrap();
        assert_eq!(qr.version(), version);
        assert!(*qr.mask().unwrap() < 4);
        let matrix = qr.to_matrix();
        assert_eq!(matrix.width(), version.width());
    }

    #[test]
    fn test_micro_auto_version() {
        let qr = QRBuilder::new(b"12345").micro(true).ec_level(ECLevel::L).build().unwrap();
        assert_eq!(qr.version(), Version::Micro(1));
        let qr = QRBuilder::new(b"12345").micro(true).build().unwrap();
        assert_eq!(qr.version(), Version::Micro(1));
        assert_eq!(qr.ec_level(), ECLevel::L);
        let qr = QRBuilder::new(b"12345").micro(true).ec_level(ECLevel::M).build().unwrap();
        assert_eq!(qr.version(), Version::Micro(2));
    }

    #[test]
    fn test_default_level_is_low() {
        // 140 bits fit 1-L (152) but not 1-M (128)
        let qr = QRBuilder::new(b"abcdefghijklmnop").build().unwrap();
        assert_eq!(qr.version(), Version::Normal(1));
        assert_eq!(qr.ec_level(), ECLevel::L);
    }

    #[test]
    fn test_boost_error() {
        let qr = QRBuilder::new(b"1").ec_level(ECLevel::L).build().unwrap();
        assert_eq!(qr.ec_level(), ECLevel::H);
        let qr = QRBuilder::new(b"1").ec_level(ECLevel::L).boost_error(false).build().unwrap();
        assert_eq!(qr.ec_level(), ECLevel::L);
    }

    #[test]
    fn test_invalid_micro_mask() {
        let res = QRBuilder::new(b"1").micro(true).mask(MaskPattern::new(5).unwrap()).build();
        assert!(matches!(res, Err(BarcodeError::InvalidMask(5))));
    }

    #[test]
    fn test_unsupported_micro_level() {
        let res = QRBuilder::new(b"1").version(Version::Micro(2)).ec_level(ECLevel::Q).build();
        assert!(matches!(res, Err(BarcodeError::UnsupportedErrorLevel(..))));
    }

    #[test]
    fn test_builder_data_overflow() {
        let data = "1234567890".repeat(306);
        let res = QRBuilder::new(data.as_bytes())
            .version(Version::Normal(40))
            .ec_level(ECLevel::H)
            .build();
        assert!(matches!(res, Err(BarcodeError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_explicit_mode() {
        let qr = QRBuilder::new(b"12345").mode(Mode::Byte).build();
        assert!(qr.is_ok());
        let qr = QRBuilder::new(b"abc").mode(Mode::Numeric).build();
        assert!(matches!(qr, Err(BarcodeError::UnsupportedMode("numeric"))));
    }
}
