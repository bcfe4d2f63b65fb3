//! Transparent decompression of gzip-wrapped FITS files (`*.fits.gz`).

use super::FitsError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;

/// Returns `true` if `data` starts with the gzip magic bytes.
pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

fn skip_zero_terminated(data: &[u8], pos: usize) -> usize {
    match data.get(pos..).and_then(|rest| rest.iter().position(|&b| b == 0)) {
        Some(len) => pos + len + 1,
        None => data.len(),
    }
}

/// Strip the gzip member header and 8-byte trailer, returning the raw
/// deflate payload.
fn deflate_payload(data: &[u8]) -> Result<&[u8], FitsError> {
    // ID1 ID2 CM FLG MTIME(4) XFL OS
    if data.len() < 18 || !is_gzip(data) || data[2] != 8 {
        return Err(FitsError::Decompression);
    }
    let flags = data[3];
    let mut pos = 10;

    if flags & FEXTRA != 0 {
        let xlen = data
            .get(pos..pos + 2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]) as usize)
            .ok_or(FitsError::Decompression)?;
        pos += 2 + xlen;
    }
    if flags & FNAME != 0 {
        pos = skip_zero_terminated(data, pos);
    }
    if flags & FCOMMENT != 0 {
        pos = skip_zero_terminated(data, pos);
    }
    if flags & FHCRC != 0 {
        pos += 2;
    }

    if data.len() < pos + 8 {
        return Err(FitsError::Decompression);
    }
    Ok(&data[pos..data.len() - 8])
}

/// Inflate a gzip stream into memory.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, FitsError> {
    let payload = deflate_payload(data)?;
    miniz_oxide::inflate::decompress_to_vec(payload).map_err(|_| FitsError::Decompression)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gzip(payload: &[u8], flags: u8, extra: &[u8]) -> Vec<u8> {
        let mut out = vec![0x1f, 0x8b, 8, flags, 0, 0, 0, 0, 0, 255];
        out.extend_from_slice(extra);
        out.extend_from_slice(&miniz_oxide::deflate::compress_to_vec(payload, 6));
        // CRC32 is not verified on read.
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out
    }

    #[test]
    fn inflates_plain_member() {
        let data = gzip(b"SIMPLE  =                    T", 0, &[]);
        assert!(is_gzip(&data));
        assert_eq!(decompress(&data).unwrap(), b"SIMPLE  =                    T");
    }

    #[test]
    fn skips_file_name_field() {
        let data = gzip(b"OI_REVN", FNAME, b"vis.fits\0");
        assert_eq!(decompress(&data).unwrap(), b"OI_REVN");
    }

    #[test]
    fn skips_extra_field() {
        let data = gzip(b"payload", FEXTRA, &[3, 0, b'a', b'b', b'c']);
        assert_eq!(decompress(&data).unwrap(), b"payload");
    }

    #[test]
    fn rejects_truncated_stream() {
        assert!(matches!(
            decompress(&[0x1f, 0x8b, 8, 0]),
            Err(FitsError::Decompression)
        ));
    }

    #[test]
    fn plain_fits_is_not_gzip() {
        assert!(!is_gzip(b"SIMPLE  ="));
    }
}
