//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Notification delivery lifecycle status.
    ///
    /// Transitions: Pending → Processing → Sent, or Processing →
    /// Retrying → Processing → … until Sent or Failed. Sent and Failed
    /// are terminal.
    NotificationStatus {
        Pending = 1,
        Processing = 2,
        Sent = 3,
        Retrying = 4,
        Failed = 5,
    }
}

impl NotificationStatus {
    /// Human-readable name matching the `notification_statuses` seed rows.
    pub fn name(self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Processing => "processing",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Retrying => "retrying",
            NotificationStatus::Failed => "failed",
        }
    }

    /// Look up a status by its seed-row name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(NotificationStatus::Pending),
            "processing" => Some(NotificationStatus::Processing),
            "sent" => Some(NotificationStatus::Sent),
            "retrying" => Some(NotificationStatus::Retrying),
            "failed" => Some(NotificationStatus::Failed),
            _ => None,
        }
    }

    /// Look up a status by its database ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(NotificationStatus::Pending),
            2 => Some(NotificationStatus::Processing),
            3 => Some(NotificationStatus::Sent),
            4 => Some(NotificationStatus::Retrying),
            5 => Some(NotificationStatus::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for status in [
            NotificationStatus::Pending,
            NotificationStatus::Processing,
            NotificationStatus::Sent,
            NotificationStatus::Retrying,
            NotificationStatus::Failed,
        ] {
            assert_eq!(NotificationStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(NotificationStatus::from_id(99), None);
    }
}
