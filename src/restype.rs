#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
/// The type of resource stored in an ICO/CUR file.
pub enum ResourceType {
    /// Plain images (ICO files)
    Icon,
    /// Images with cursor hotspots (CUR files)
    Cursor,
}

impl ResourceType {
    pub(crate) fn from_number(number: u16) -> Option<ResourceType> {
        match number {
            1 => Some(ResourceType::Icon),
            2 => Some(ResourceType::Cursor),
            _ => None,
        }
    }

    pub(crate) fn number(&self) -> u16 {
        match *self {
            ResourceType::Icon => 1,
            ResourceType::Cursor => 2,
        }
    }

    /// Interprets the two 16-bit auxiliary fields of a directory record
    /// according to this resource type.
    pub(crate) fn fields(&self, first: u16, second: u16) -> EntryFields {
        match *self {
            ResourceType::Icon => EntryFields::Icon {
                color_planes: first,
                bits_per_pixel: second,
            },
            ResourceType::Cursor => {
                EntryFields::Cursor { hotspot_x: first, hotspot_y: second }
            }
        }
    }
}

//===========================================================================//

/// The two type-specific 16-bit fields of a directory record.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum EntryFields {
    /// Icon entries store the color-plane count and bits-per-pixel.
    Icon {
        /// Number of color planes (normally 0 or 1).
        color_planes: u16,
        /// Color depth of the bitmap payload.
        bits_per_pixel: u16,
    },
    /// Cursor entries store the hotspot, in pixels right from the left edge
    /// and down from the top edge.
    Cursor {
        /// Hotspot column.
        hotspot_x: u16,
        /// Hotspot row.
        hotspot_y: u16,
    },
}

impl EntryFields {
    /// Returns the resource type these fields belong to.
    pub fn resource_type(&self) -> ResourceType {
        match *self {
            EntryFields::Icon { .. } => ResourceType::Icon,
            EntryFields::Cursor { .. } => ResourceType::Cursor,
        }
    }

    /// Returns the raw values in on-disk order.
    pub(crate) fn to_pair(self) -> (u16, u16) {
        match self {
            EntryFields::Icon { color_planes, bits_per_pixel } => {
                (color_planes, bits_per_pixel)
            }
            EntryFields::Cursor { hotspot_x, hotspot_y } => {
                (hotspot_x, hotspot_y)
            }
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{EntryFields, ResourceType};

    #[test]
    fn resource_type_round_trip() {
        let restypes = &[ResourceType::Icon, ResourceType::Cursor];
        for &restype in restypes.iter() {
            assert_eq!(
                ResourceType::from_number(restype.number()),
                Some(restype)
            );
        }
    }

    #[test]
    fn unknown_resource_types() {
        assert_eq!(ResourceType::from_number(0), None);
        assert_eq!(ResourceType::from_number(3), None);
    }

    #[test]
    fn fields_follow_resource_type() {
        let icon = ResourceType::Icon.fields(1, 32);
        assert_eq!(
            icon,
            EntryFields::Icon { color_planes: 1, bits_per_pixel: 32 }
        );
        assert_eq!(icon.resource_type(), ResourceType::Icon);
        let cursor = ResourceType::Cursor.fields(5, 7);
        assert_eq!(cursor, EntryFields::Cursor { hotspot_x: 5, hotspot_y: 7 });
        assert_eq!(cursor.to_pair(), (5, 7));
    }
}

//===========================================================================//
