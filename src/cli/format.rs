//! Output formatting for CLI display.

use crate::model::{
    CollectionSession, NearbyNetwork, PermissionState, PersistedObservation, Stage,
};

/// Format a session as a short human-readable summary, one field per line.
pub(super) fn format_session(session: &CollectionSession) -> String {
    let obs = &session.observation;
    let network = obs.network_id.as_deref().unwrap_or("-");
    let signal = obs
        .signal_level
        .map_or_else(|| "-".to_string(), |l| l.to_string());
    let position = obs
        .position
        .map_or_else(|| "-".to_string(), |p| format!("{:.6}, {:.6}", p.lat, p.lon));

    let mut lines = vec![
        format!("permission: {}", format_permission(session.permission)),
        format!("network:    {network}"),
        format!("signal:     {signal}"),
        format!("position:   {position}"),
    ];
    for error in &session.failed {
        lines.push(format!(
            "failed:     {} ({})",
            format_stage(error.stage),
            error.message
        ));
    }
    lines.join("\n")
}

/// Format a persisted record as one table row.
pub(super) fn format_record(p: &PersistedObservation) -> String {
    let short_id = &p.id.to_string()[..8];
    let r = &p.record;
    format!(
        "{short_id}  {}  {:>4}  {:.6}, {:.6}  {}",
        r.captured_at, r.signal_level, r.position.lat, r.position.lon, r.network_id
    )
}

pub(super) fn format_nearby(n: &NearbyNetwork) -> String {
    format!("{:>4}  {}", n.level, n.identifier)
}

pub(super) fn format_permission(state: PermissionState) -> &'static str {
    match state {
        PermissionState::Unknown => "not yet asked",
        PermissionState::Granted => "granted",
        PermissionState::Denied => "denied",
    }
}

fn format_stage(stage: Stage) -> &'static str {
    match stage {
        Stage::Permission => "permission",
        Stage::Network => "network",
        Stage::Position => "position",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uuid::Uuid;

    use crate::model::{Observation, Position, Record};

    #[test]
    fn format_partial_session() {
        let mut session = CollectionSession {
            observation: Observation {
                network_id: Some("NET1".into()),
                signal_level: Some(-54),
                position: None,
            },
            permission: PermissionState::Granted,
            ..Default::default()
        };
        session.fail(Stage::Position, "unavailable: no fix");

        assert_eq!(
            format_session(&session),
            "permission: granted\n\
             network:    NET1\n\
             signal:     -54\n\
             position:   -\n\
             failed:     position (unavailable: no fix)"
        );
    }

    #[test]
    fn format_denied_session() {
        let mut session = CollectionSession {
            permission: PermissionState::Denied,
            ..Default::default()
        };
        session.fail(Stage::Permission, "location permission denied");

        let text = format_session(&session);
        assert!(text.starts_with("permission: denied\nnetwork:    -\n"));
        assert!(text.ends_with("failed:     permission (location permission denied)"));
    }

    #[test]
    fn format_record_row() {
        let p = PersistedObservation {
            id: "a3b0fc12-0000-4000-8000-000000000000".parse::<Uuid>().unwrap(),
            record: Record {
                network_id: "NET1".into(),
                signal_level: -54,
                position: Position {
                    lat: 37.0,
                    lon: -122.0,
                },
                captured_at: "2026-10-18T12:00:00Z".parse().unwrap(),
            },
        };
        assert_eq!(
            format_record(&p),
            "a3b0fc12  2026-10-18T12:00:00Z   -54  37.000000, -122.000000  NET1"
        );
    }

    #[test]
    fn format_nearby_row() {
        let n = NearbyNetwork {
            identifier: "Cafe:Guest".into(),
            level: 72,
        };
        assert_eq!(format_nearby(&n), "  72  Cafe:Guest");
    }
}
