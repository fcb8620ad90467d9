use crate::{ArchivedFrame, Rgba};

// little-endian frame id, then R, G, B, A per pixel
pub const HEADER_LEN: usize = size_of::<u64>();
pub const BYTES_PER_PIXEL: usize = 4;

#[inline]
pub const fn encoded_len(num_pixels: usize) -> usize {
    HEADER_LEN + num_pixels * BYTES_PER_PIXEL
}

/// Encodes a frame into `buf`, replacing its previous contents.
pub fn encode_frame(frame_id: u64, pixels: &[Rgba], buf: &mut Vec<u8>) {
    encode_pixels(frame_id, pixels.iter().copied(), buf);
}

/// Same as [`encode_frame`], reading pixels straight out of an archived frame.
pub fn encode_archived(frame_id: u64, frame: &ArchivedFrame, buf: &mut Vec<u8>) {
    encode_pixels(frame_id, frame.pixels.iter().map(Rgba::from), buf);
}

fn encode_pixels(frame_id: u64, pixels: impl ExactSizeIterator<Item = Rgba>, buf: &mut Vec<u8>) {
    buf.clear();
    buf.reserve(encoded_len(pixels.len()));

    buf.extend_from_slice(&frame_id.to_le_bytes());
    for pixel in pixels {
        buf.extend_from_slice(&pixel.to_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_archived, encode_frame, encoded_len};
    use crate::{ArchivedFrame, Frame, Rgba};

    #[test]
    fn header_then_rgba() {
        let pixels = [Rgba::new(1, 2, 3, 4), Rgba::OFF, Rgba::new(255, 0, 128, 255)];
        let mut buf = Vec::new();
        encode_frame(0x0102_0304, &pixels, &mut buf);

        assert_eq!(buf.len(), encoded_len(3));
        assert_eq!(
            buf,
            [
                4, 3, 2, 1, 0, 0, 0, 0, 1, 2, 3, 4, 0, 0, 0, 0, 255, 0, 128, 255
            ]
        );
    }

    #[test]
    fn header_holds_ids_past_u32() {
        let mut buf = Vec::new();
        encode_frame(u64::from(u32::MAX) + 1, &[Rgba::OFF], &mut buf);

        assert_eq!(buf[..8], [0, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(buf.len(), encoded_len(1));
    }

    #[test]
    fn buffer_is_reused() {
        let mut buf = vec![9; 64];
        encode_frame(7, &[], &mut buf);

        assert_eq!(buf, [7, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn archived_frame_encodes_identically() {
        let frame = Frame {
            index: 12,
            pixels: vec![Rgba::new(10, 20, 30, 255), Rgba::new(40, 50, 60, 255)],
        };
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&frame).unwrap();
        let archived = rkyv::access::<ArchivedFrame, rkyv::rancor::Error>(&bytes).unwrap();

        let mut live = Vec::new();
        let mut replayed = Vec::new();
        encode_frame(99, &frame.pixels, &mut live);
        encode_archived(99, archived, &mut replayed);

        assert_eq!(live, replayed);
        assert_eq!(archived.index.to_native(), 12);
    }
}
