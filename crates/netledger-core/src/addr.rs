// ── IPv4 / MAC address arithmetic ──
//
// Pure helpers with no store dependency: dotted-quad <-> integer
// conversion, syntax checks, range expansion, and CIDR math.

use std::fmt;
use std::net::Ipv4Addr;

/// Hard ceiling on the number of addresses a single range may expand to.
pub const MAX_RANGE_ADDRESSES: u32 = 1024;

// ── Conversion ──────────────────────────────────────────────────────

/// Dotted-quad to integer, big-endian octet order.
pub fn ip_to_number(ip: Ipv4Addr) -> u32 {
    u32::from(ip)
}

pub fn number_to_ip(n: u32) -> Ipv4Addr {
    Ipv4Addr::from(n)
}

/// Parse a dotted-quad address.
///
/// Accepts four groups of one to three ASCII digits, each in `0..=255`.
/// Unlike [`Ipv4Addr::from_str`], leading zeros are tolerated:
/// `"010.001.000.001"` parses as `10.1.0.1`.
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');

    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse::<u8>().ok()?;
    }

    if parts.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

pub fn is_valid_ip(s: &str) -> bool {
    parse_ipv4(s).is_some()
}

// ── MAC addresses ───────────────────────────────────────────────────

/// Six hex pairs separated by `:` or `-` (separators may be mixed).
pub fn is_valid_mac(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 17 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| {
        if i % 3 == 2 {
            matches!(b, b':' | b'-')
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

/// Canonicalize a MAC address to upper-case, colon-separated form.
///
/// Input whose separator-stripped form cannot be split into whole pairs
/// is returned unchanged.
pub fn format_mac(s: &str) -> String {
    let stripped: Vec<char> = s.chars().filter(|c| !matches!(c, ':' | '-')).collect();
    if stripped.is_empty() || stripped.len() % 2 != 0 {
        return s.to_owned();
    }
    stripped
        .chunks(2)
        .map(|pair| pair.iter().collect::<String>().to_uppercase())
        .collect::<Vec<_>>()
        .join(":")
}

// ── Range expansion ─────────────────────────────────────────────────

/// Result of expanding a start/end pair into concrete addresses.
///
/// Expansion stops at [`MAX_RANGE_ADDRESSES`]; `requested` keeps the
/// size of the original span so callers can report truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRange {
    pub addresses: Vec<Ipv4Addr>,
    pub requested: u64,
}

impl GeneratedRange {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// `true` when the span was longer than the cap.
    pub fn truncated(&self) -> bool {
        self.requested > u64::from(MAX_RANGE_ADDRESSES)
    }
}

/// Enumerate every address from `start` to `end` inclusive, ascending.
///
/// An inverted span (`end < start`) yields an empty result.
pub fn generate_ip_range(start: Ipv4Addr, end: Ipv4Addr) -> GeneratedRange {
    let first = ip_to_number(start);
    let last = ip_to_number(end);
    if last < first {
        return GeneratedRange {
            addresses: Vec::new(),
            requested: 0,
        };
    }

    let requested = u64::from(last - first) + 1;
    let count = u32::try_from(requested.min(u64::from(MAX_RANGE_ADDRESSES)))
        .unwrap_or(MAX_RANGE_ADDRESSES);

    GeneratedRange {
        addresses: (0..count).map(|i| number_to_ip(first + i)).collect(),
        requested,
    }
}

// ── CIDR ────────────────────────────────────────────────────────────

/// First and last address of a parsed CIDR block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrBounds {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
    pub prefix: u8,
}

impl fmt::Display for CidrBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Parse `a.b.c.d/n` into its usable host range.
///
/// For prefixes up to /30 the network and broadcast addresses are
/// excluded; /31 and /32 return the whole block.
pub fn parse_cidr(cidr: &str) -> Option<CidrBounds> {
    let (ip, prefix) = cidr.split_once('/')?;
    let ip = parse_ipv4(ip)?;

    if prefix.is_empty() || prefix.len() > 2 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let prefix: u8 = prefix.parse().ok()?;
    if prefix > 32 {
        return None;
    }

    let mask = if prefix == 0 {
        0
    } else {
        !((1u32 << (32 - prefix)) - 1)
    };
    let network = ip_to_number(ip) & mask;
    let broadcast = network | !mask;

    let (start, end) = if prefix <= 30 {
        (network + 1, broadcast - 1)
    } else {
        (network, broadcast)
    };

    Some(CidrBounds {
        start: number_to_ip(start),
        end: number_to_ip(end),
        prefix,
    })
}

/// Approximate a CIDR label for a start/end pair.
///
/// Picks the smallest prefix whose block holds the range's address
/// count and prefixes it with `start` verbatim. This is not an inverse
/// of [`parse_cidr`]: the start address is not aligned to the block and
/// the usable-host trimming is ignored.
pub fn calculate_cidr(start: Ipv4Addr, end: Ipv4Addr) -> Option<String> {
    let first = ip_to_number(start);
    let last = ip_to_number(end);
    if last < first {
        return None;
    }

    let count = u64::from(last - first) + 1;
    let bits = count.next_power_of_two().trailing_zeros();
    let prefix = 32u32.checked_sub(bits)?;

    Some(format!("{start}/{prefix}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn number_round_trip() {
        for s in ["0.0.0.0", "10.0.0.1", "192.168.1.254", "255.255.255.255"] {
            assert_eq!(number_to_ip(ip_to_number(ip(s))).to_string(), s);
        }
    }

    #[test]
    fn ip_to_number_is_big_endian() {
        assert_eq!(ip_to_number(ip("1.2.3.4")), 0x0102_0304);
        assert_eq!(number_to_ip(0xC0A8_0101), ip("192.168.1.1"));
    }

    #[test]
    fn parse_ipv4_accepts_dotted_quads() {
        assert_eq!(parse_ipv4("192.168.1.10"), Some(ip("192.168.1.10")));
        assert_eq!(parse_ipv4("0.0.0.0"), Some(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn parse_ipv4_tolerates_leading_zeros() {
        assert_eq!(parse_ipv4("010.001.000.001"), Some(ip("10.1.0.1")));
    }

    #[test]
    fn parse_ipv4_rejects_malformed_input() {
        for bad in [
            "",
            "1.2.3",
            "1.2.3.4.5",
            "256.1.1.1",
            "1.2.3.-4",
            "1..3.4",
            "1.2.3.4 ",
            "1.2.3.0004",
            "a.b.c.d",
            "+1.2.3.4",
        ] {
            assert!(!is_valid_ip(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn mac_validation() {
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
        assert!(is_valid_mac("AA-BB-CC-DD-EE-FF"));
        assert!(is_valid_mac("aa-bb:cc-dd:ee-ff"));
        assert!(!is_valid_mac("aabbccddeeff"));
        assert!(!is_valid_mac("aa:bb:cc:dd:ee"));
        assert!(!is_valid_mac("gg:bb:cc:dd:ee:ff"));
        assert!(!is_valid_mac("aa:bb:cc:dd:ee:ff:00"));
    }

    #[test]
    fn format_mac_canonicalizes() {
        assert_eq!(format_mac("aa-bb-cc-dd-ee-ff"), "AA:BB:CC:DD:EE:FF");
        assert_eq!(format_mac("aabbccddeeff"), "AA:BB:CC:DD:EE:FF");
        assert_eq!(format_mac("AA:bb:CC:dd:EE:ff"), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn format_mac_leaves_odd_input_alone() {
        assert_eq!(format_mac("abc"), "abc");
        assert_eq!(format_mac(""), "");
    }

    #[test]
    fn generate_small_range() {
        let range = generate_ip_range(ip("192.168.1.1"), ip("192.168.1.5"));
        assert_eq!(range.len(), 5);
        assert_eq!(range.requested, 5);
        assert!(!range.truncated());
        assert_eq!(range.addresses.first(), Some(&ip("192.168.1.1")));
        assert_eq!(range.addresses.last(), Some(&ip("192.168.1.5")));
        assert!(range.addresses.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn generate_crosses_octet_boundary() {
        let range = generate_ip_range(ip("10.0.0.254"), ip("10.0.1.1"));
        let rendered: Vec<String> = range.addresses.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["10.0.0.254", "10.0.0.255", "10.0.1.0", "10.0.1.1"]);
    }

    #[test]
    fn generate_single_address() {
        let range = generate_ip_range(ip("10.0.0.7"), ip("10.0.0.7"));
        assert_eq!(range.addresses, vec![ip("10.0.0.7")]);
    }

    #[test]
    fn generate_caps_at_1024() {
        let range = generate_ip_range(ip("10.0.0.0"), ip("10.0.255.255"));
        assert_eq!(range.len(), 1024);
        assert_eq!(range.requested, 65_536);
        assert!(range.truncated());
        assert_eq!(range.addresses.last(), Some(&ip("10.0.3.255")));
    }

    #[test]
    fn generate_exactly_1024_is_not_truncated() {
        let range = generate_ip_range(ip("10.0.0.0"), ip("10.0.3.255"));
        assert_eq!(range.len(), 1024);
        assert!(!range.truncated());
    }

    #[test]
    fn generate_inverted_span_is_empty() {
        let range = generate_ip_range(ip("10.0.0.9"), ip("10.0.0.1"));
        assert!(range.is_empty());
        assert!(!range.truncated());
    }

    #[test]
    fn generate_full_address_space_does_not_overflow() {
        let range = generate_ip_range(Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST);
        assert_eq!(range.len(), 1024);
        assert_eq!(range.requested, 1u64 << 32);
    }

    #[test]
    fn parse_cidr_trims_network_and_broadcast() {
        let bounds = parse_cidr("192.168.1.0/24").unwrap();
        assert_eq!(bounds.start, ip("192.168.1.1"));
        assert_eq!(bounds.end, ip("192.168.1.254"));
        assert_eq!(bounds.prefix, 24);
    }

    #[test]
    fn parse_cidr_normalizes_host_bits() {
        let bounds = parse_cidr("192.168.1.77/24").unwrap();
        assert_eq!(bounds.start, ip("192.168.1.1"));
        assert_eq!(bounds.end, ip("192.168.1.254"));
    }

    #[test]
    fn parse_cidr_slash_30() {
        let bounds = parse_cidr("10.0.0.4/30").unwrap();
        assert_eq!(bounds.start, ip("10.0.0.5"));
        assert_eq!(bounds.end, ip("10.0.0.6"));
    }

    #[test]
    fn parse_cidr_slash_31_and_32_are_untrimmed() {
        let bounds = parse_cidr("10.0.0.0/31").unwrap();
        assert_eq!(bounds.start, ip("10.0.0.0"));
        assert_eq!(bounds.end, ip("10.0.0.1"));

        let bounds = parse_cidr("10.0.0.9/32").unwrap();
        assert_eq!(bounds.start, ip("10.0.0.9"));
        assert_eq!(bounds.end, ip("10.0.0.9"));
    }

    #[test]
    fn parse_cidr_slash_0() {
        let bounds = parse_cidr("0.0.0.0/0").unwrap();
        assert_eq!(bounds.start, ip("0.0.0.1"));
        assert_eq!(bounds.end, ip("255.255.255.254"));
    }

    #[test]
    fn parse_cidr_rejects_malformed_input() {
        for bad in [
            "192.168.1.0",
            "192.168.1.0/",
            "192.168.1.0/33",
            "192.168.1.0/024",
            "192.168.1.0/2a",
            "300.168.1.0/24",
            "/24",
            "192.168.1.0/24/1",
        ] {
            assert!(parse_cidr(bad).is_none(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn calculate_cidr_picks_smallest_covering_prefix() {
        assert_eq!(
            calculate_cidr(ip("192.168.1.1"), ip("192.168.1.254")).as_deref(),
            Some("192.168.1.1/24")
        );
        assert_eq!(
            calculate_cidr(ip("10.0.0.1"), ip("10.0.0.5")).as_deref(),
            Some("10.0.0.1/29")
        );
        assert_eq!(
            calculate_cidr(ip("10.0.0.1"), ip("10.0.0.1")).as_deref(),
            Some("10.0.0.1/32")
        );
        assert_eq!(
            calculate_cidr(Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST).as_deref(),
            Some("0.0.0.0/0")
        );
    }

    #[test]
    fn calculate_cidr_rejects_inverted_span() {
        assert!(calculate_cidr(ip("10.0.0.5"), ip("10.0.0.1")).is_none());
    }
}
