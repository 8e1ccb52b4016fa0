//! Opaque bit-set wrappers over the kernel's flag words.
//!
//! The wire format exposes several plain `u32`/`u16` bit-fields (interface
//! state flags, address flags, neighbor state, message flags, multicast
//! group mask). Exposing raw integers at the API boundary invites callers
//! to depend on bit layouts that differ across header revisions, so each
//! one is wrapped in a `bitflags!` type offering `contains`/`union`/
//! `intersection` instead of bitwise operators.

use bitflags::bitflags;

bitflags! {
    /// Interface state bits carried in [`crate::events::LinkEvent::flags`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LinkFlags: u32 {
        const UP          = libc::IFF_UP as u32;
        const BROADCAST   = libc::IFF_BROADCAST as u32;
        const LOOPBACK    = libc::IFF_LOOPBACK as u32;
        const POINTOPOINT = libc::IFF_POINTOPOINT as u32;
        const RUNNING     = libc::IFF_RUNNING as u32;
        const NOARP       = libc::IFF_NOARP as u32;
        const PROMISC     = libc::IFF_PROMISC as u32;
        const MULTICAST   = libc::IFF_MULTICAST as u32;
        const LOWER_UP    = 0x1_0000;
        const DORMANT     = 0x2_0000;
    }
}

bitflags! {
    /// Address flag bits carried in [`crate::events::AddressEvent::flags`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AddressFlags: u32 {
        const TEMPORARY = libc::IFA_F_TEMPORARY as u32;
        const NODAD     = libc::IFA_F_NODAD as u32;
        const OPTIMISTIC = libc::IFA_F_OPTIMISTIC as u32;
        const DADFAILED = libc::IFA_F_DADFAILED as u32;
        const HOMEADDRESS = libc::IFA_F_HOMEADDRESS as u32;
        const DEPRECATED = libc::IFA_F_DEPRECATED as u32;
        const TENTATIVE = libc::IFA_F_TENTATIVE as u32;
        const PERMANENT = libc::IFA_F_PERMANENT as u32;
        const SECONDARY = libc::IFA_F_SECONDARY as u32;
    }
}

bitflags! {
    /// Neighbor reachability state, `NUD_*`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NeighborState: u16 {
        const INCOMPLETE = libc::NUD_INCOMPLETE as u16;
        const REACHABLE  = libc::NUD_REACHABLE as u16;
        const STALE      = libc::NUD_STALE as u16;
        const DELAY      = libc::NUD_DELAY as u16;
        const PROBE      = libc::NUD_PROBE as u16;
        const FAILED     = libc::NUD_FAILED as u16;
        const NOARP      = libc::NUD_NOARP as u16;
        const PERMANENT  = libc::NUD_PERMANENT as u16;
    }
}

bitflags! {
    /// Neighbor entry flags, `NTF_*`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NeighborFlags: u8 {
        const USE      = libc::NTF_USE as u8;
        const SELF     = libc::NTF_SELF as u8;
        const ROUTER   = libc::NTF_ROUTER as u8;
        const PROXY    = libc::NTF_PROXY as u8;
    }
}

bitflags! {
    /// Request flags placed in [`crate::header::MessageHeader::flags`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MessageFlags: u16 {
        const REQUEST = libc::NLM_F_REQUEST as u16;
        const MULTI   = libc::NLM_F_MULTI as u16;
        const ACK     = libc::NLM_F_ACK as u16;
        const DUMP    = libc::NLM_F_DUMP as u16;
        const CREATE  = libc::NLM_F_CREATE as u16;
        const EXCL    = libc::NLM_F_EXCL as u16;
        const REPLACE = libc::NLM_F_REPLACE as u16;
    }
}

bitflags! {
    /// Broadcast group subscription mask passed to `bind`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GroupMask: u32 {
        const LINK        = 1 << (libc::RTNLGRP_LINK as u32 - 1);
        const NEIGH       = 1 << (libc::RTNLGRP_NEIGH as u32 - 1);
        const IPV4_IFADDR = 1 << (libc::RTNLGRP_IPV4_IFADDR as u32 - 1);
        const IPV6_IFADDR = 1 << (libc::RTNLGRP_IPV6_IFADDR as u32 - 1);
        const IPV4_ROUTE  = 1 << (libc::RTNLGRP_IPV4_ROUTE as u32 - 1);
        const IPV6_ROUTE  = 1 << (libc::RTNLGRP_IPV6_ROUTE as u32 - 1);
    }
}

impl GroupMask {
    /// The listener's default subscription: links, neighbors, and both
    /// address families' addresses and routes.
    pub const LISTENER_DEFAULT: GroupMask = GroupMask::LINK
        .union(GroupMask::NEIGH)
        .union(GroupMask::IPV4_IFADDR)
        .union(GroupMask::IPV6_IFADDR)
        .union(GroupMask::IPV4_ROUTE)
        .union(GroupMask::IPV6_ROUTE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_default_contains_all_six_groups() {
        let mask = GroupMask::LISTENER_DEFAULT;
        assert!(mask.contains(GroupMask::LINK));
        assert!(mask.contains(GroupMask::NEIGH));
        assert!(mask.contains(GroupMask::IPV4_IFADDR));
        assert!(mask.contains(GroupMask::IPV6_IFADDR));
        assert!(mask.contains(GroupMask::IPV4_ROUTE));
        assert!(mask.contains(GroupMask::IPV6_ROUTE));
    }

    #[test]
    fn neighbor_state_union_and_intersection() {
        let a = NeighborState::REACHABLE | NeighborState::STALE;
        assert!(a.contains(NeighborState::REACHABLE));
        assert!(a.intersection(NeighborState::PROBE).is_empty());
    }
}
