//! Dispatch status enumeration mapping to the `dispatch_statuses` lookup table.
//!
//! The enum discriminants match the seed data order (1-based) in the
//! database, so a raw `status_id` column round-trips losslessly. Status is a
//! closed set: rows can never hold a value outside these eight.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:expr ),+ $(,)?
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

            /// Lowercase label as stored in the lookup table's `name` column.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }

            /// Resolve a raw status ID read from the database.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
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
    /// Patrol dispatch lifecycle status.
    DispatchStatus {
        /// Broadcast to every on-duty officer of the station, unclaimed.
        Pending = 1 => "pending",
        /// Created with a pre-selected officer, awaiting their acceptance.
        Assigned = 2 => "assigned",
        /// Declined before acceptance. Terminal.
        Declined = 3 => "declined",
        /// Claimed by exactly one officer.
        Accepted = 4 => "accepted",
        /// Officer is travelling to the scene.
        EnRoute = 5 => "en_route",
        /// Officer is on scene; response SLA is settled at this point.
        Arrived = 6 => "arrived",
        /// Verified valid or invalid by the officer. Terminal.
        Completed = 7 => "completed",
        /// Cancelled by an admin. Terminal.
        Cancelled = 8 => "cancelled",
    }
}

/// Statuses counted against the one-active-dispatch-per-report invariant.
pub const ACTIVE_STATUSES: [DispatchStatus; 5] = [
    DispatchStatus::Pending,
    DispatchStatus::Assigned,
    DispatchStatus::Accepted,
    DispatchStatus::EnRoute,
    DispatchStatus::Arrived,
];

/// Terminal statuses. A dispatch in one of these never transitions again.
pub const TERMINAL_STATUSES: [DispatchStatus; 3] = [
    DispatchStatus::Declined,
    DispatchStatus::Completed,
    DispatchStatus::Cancelled,
];

impl DispatchStatus {
    /// Whether this status counts toward the single-active-dispatch invariant.
    pub fn is_active(self) -> bool {
        ACTIVE_STATUSES.contains(&self)
    }

    /// Whether this status is terminal.
    pub fn is_terminal(self) -> bool {
        TERMINAL_STATUSES.contains(&self)
    }

    /// Whether an officer may still claim the dispatch from this status.
    pub fn is_claimable(self) -> bool {
        matches!(self, Self::Pending | Self::Assigned)
    }

    /// Validate a lifecycle transition.
    ///
    /// Mirrors the guard column of the transition table: cancel is allowed
    /// from any active status, everything else follows the linear
    /// accept -> en_route -> arrived -> completed path.
    pub fn can_transition(self, to: DispatchStatus) -> bool {
        use DispatchStatus::*;
        match (self, to) {
            (Pending | Assigned, Accepted) => true,
            (Pending | Assigned, Declined) => true,
            (Accepted, EnRoute) => true,
            (EnRoute, Arrived) => true,
            (Arrived, Completed) => true,
            (from, Cancelled) => from.is_active(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_match_seed_data() {
        assert_eq!(DispatchStatus::Pending.id(), 1);
        assert_eq!(DispatchStatus::Assigned.id(), 2);
        assert_eq!(DispatchStatus::Declined.id(), 3);
        assert_eq!(DispatchStatus::Accepted.id(), 4);
        assert_eq!(DispatchStatus::EnRoute.id(), 5);
        assert_eq!(DispatchStatus::Arrived.id(), 6);
        assert_eq!(DispatchStatus::Completed.id(), 7);
        assert_eq!(DispatchStatus::Cancelled.id(), 8);
    }

    #[test]
    fn from_id_round_trips() {
        for id in 1..=8 {
            let status = DispatchStatus::from_id(id).unwrap();
            assert_eq!(status.id(), id);
        }
        assert!(DispatchStatus::from_id(0).is_none());
        assert!(DispatchStatus::from_id(9).is_none());
    }

    #[test]
    fn active_and_terminal_partition_the_status_set() {
        for id in 1..=8 {
            let status = DispatchStatus::from_id(id).unwrap();
            assert_ne!(status.is_active(), status.is_terminal());
        }
    }

    #[test]
    fn accept_allowed_only_from_claimable_statuses() {
        use DispatchStatus::*;
        assert!(Pending.can_transition(Accepted));
        assert!(Assigned.can_transition(Accepted));
        for from in [Declined, Accepted, EnRoute, Arrived, Completed, Cancelled] {
            assert!(!from.can_transition(Accepted), "{from:?} -> accepted");
        }
    }

    #[test]
    fn linear_path_transitions() {
        use DispatchStatus::*;
        assert!(Accepted.can_transition(EnRoute));
        assert!(EnRoute.can_transition(Arrived));
        assert!(Arrived.can_transition(Completed));

        // Skipping a step is rejected.
        assert!(!Accepted.can_transition(Arrived));
        assert!(!EnRoute.can_transition(Completed));
        assert!(!Pending.can_transition(EnRoute));
    }

    #[test]
    fn cancel_allowed_from_every_active_status_only() {
        use DispatchStatus::*;
        for from in ACTIVE_STATUSES {
            assert!(from.can_transition(Cancelled), "{from:?} -> cancelled");
        }
        for from in TERMINAL_STATUSES {
            assert!(!from.can_transition(Cancelled), "{from:?} -> cancelled");
        }
    }

    #[test]
    fn terminal_statuses_never_transition() {
        use DispatchStatus::*;
        for from in TERMINAL_STATUSES {
            for id in 1..=8 {
                let to = DispatchStatus::from_id(id).unwrap();
                assert!(!from.can_transition(to), "{from:?} -> {to:?}");
            }
        }
    }
}
