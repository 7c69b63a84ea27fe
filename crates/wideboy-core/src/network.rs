//! Boot-time network collaborator and host identity.

use core::fmt::{self, Write};

use heapless::String;

pub const HOST_ID_BYTES: usize = 8;

/// Connected transport as seen by boot. Nothing here is touched per frame.
pub trait NetworkLink {
    type Error: fmt::Debug;

    fn connect(&mut self) -> Result<(), Self::Error>;

    fn mac_address(&self) -> [u8; 6];
}

/// Short host identifier: lowercase hex of the first four MAC bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostId(String<HOST_ID_BYTES>);

impl HostId {
    pub fn from_mac(mac: &[u8; 6]) -> Self {
        let mut id = String::new();
        for byte in &mac[..4] {
            // 4 bytes * 2 hex digits always fit.
            let _ = write!(id, "{byte:02x}");
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_id_uses_first_four_mac_bytes() {
        let id = HostId::from_mac(&[0x24, 0x0A, 0xC4, 0x00, 0xBE, 0xEF]);
        assert_eq!(id.as_str(), "240ac400");
        assert_eq!(alloc::format!("{id}"), "240ac400");
    }
}
