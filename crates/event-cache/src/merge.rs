//! Merge engine
//!
//! Folds one payload (for one locale) into the mutable state of a match. One
//! handler per [`Payload`] variant; every handler is idempotent for identical
//! input. Handlers never fail: validation happens before the state is touched.
//!
//! Precedence:
//! - booking status is owned by fixture payloads; other payloads only fill it
//!   when unset
//! - names are last-write-wins per locale, an absent name stores `""`
//! - the competitor roster is replaced wholesale
//! - nested items are created from the first payload carrying them and merged
//!   with the locale afterwards
//! - coverage info and the fixture view are replaced

use crate::ci::{
    BookingStatus, CompetitorRoster, ConditionsCi, CoverageInfoCi, DelayedInfoCi, FixtureCi,
    RoundCi, SeasonCi, TimelineCi, VenueCi, put_translation,
};
use crate::dto::{
    ChildEventData, ConditionsData, CoverageInfoData, FixtureData, Payload, SportEventData,
    SportEventType, StageType, SummaryData, TimelineData,
};
use crate::locale::Locale;
use crate::urn::Urn;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;

/// Mutable state of a match cache item
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MatchState {
    pub(crate) names: HashMap<Locale, String>,
    pub(crate) scheduled: Option<DateTime<Utc>>,
    pub(crate) scheduled_end: Option<DateTime<Utc>>,
    pub(crate) start_time_tbd: Option<bool>,
    pub(crate) replaced_by: Option<Urn>,
    pub(crate) tournament_id: Option<Urn>,
    pub(crate) tournament_round: Option<RoundCi>,
    pub(crate) season: Option<SeasonCi>,
    pub(crate) venue: Option<VenueCi>,
    pub(crate) conditions: Option<ConditionsCi>,
    pub(crate) competitors: Option<CompetitorRoster>,
    pub(crate) booking_status: Option<BookingStatus>,
    pub(crate) live_odds: Option<String>,
    pub(crate) stage_type: Option<StageType>,
    pub(crate) event_type: Option<SportEventType>,
    pub(crate) fixture: Option<FixtureCi>,
    pub(crate) delayed_info: Option<DelayedInfoCi>,
    pub(crate) coverage_info: Option<CoverageInfoCi>,
    pub(crate) timelines: HashMap<Locale, TimelineCi>,
}

/// Side effects of a merge the caller must reflect in the trackers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MergeEffects {
    /// The payload carried a roster, so the competitors class is loaded for
    /// the merged locale
    pub(crate) competitors_replaced: bool,
}

/// Apply `payload` for `locale` to `state`
pub(crate) fn apply(state: &mut MatchState, payload: &Payload, locale: &Locale) -> MergeEffects {
    match payload {
        Payload::SportEvent(data) => merge_sport_event(state, data, locale, false),
        Payload::Fixture(data) => merge_fixture(state, data, locale),
        Payload::Summary(data) => merge_summary(state, data, locale),
        Payload::Timeline(data) => merge_timeline(state, data, locale),
        Payload::ChildSummary(data) => {
            merge_child_summary(state, data, locale);
            MergeEffects::default()
        }
    }
}

fn merge_sport_event(
    state: &mut MatchState,
    data: &SportEventData,
    locale: &Locale,
    is_fixture: bool,
) -> MergeEffects {
    merge_name(state, data, locale);

    if is_fixture || state.booking_status.is_none() {
        state.booking_status = Some(BookingStatus::from_live_odds(data.live_odds.as_deref()));
    }

    state.scheduled = data.scheduled;
    state.scheduled_end = data.scheduled_end;
    state.start_time_tbd = data.start_time_tbd;
    state.replaced_by.clone_from(&data.replaced_by);

    if data.tournament_id.is_some() {
        state.tournament_id.clone_from(&data.tournament_id);
    }

    if let Some(round) = &data.tournament_round {
        match &mut state.tournament_round {
            Some(existing) => existing.merge(round, locale),
            None => state.tournament_round = Some(RoundCi::new(round, locale)),
        }
    }

    if let Some(season) = &data.season {
        match &mut state.season {
            Some(existing) => existing.merge(season, locale),
            None => state.season = Some(SeasonCi::new(season, locale)),
        }
    }

    if let Some(venue) = &data.venue {
        match &mut state.venue {
            Some(existing) => existing.merge(venue, locale),
            None => state.venue = Some(VenueCi::new(venue, locale)),
        }
    }

    if data.live_odds.is_some() {
        state.live_odds.clone_from(&data.live_odds);
    }
    if data.stage_type.is_some() {
        state.stage_type = data.stage_type;
    }
    if data.event_type.is_some() {
        state.event_type = data.event_type;
    }

    let competitors_replaced = match &data.competitors {
        Some(competitors) => {
            state.competitors = Some(CompetitorRoster::from_competitors(competitors));
            true
        }
        None => false,
    };

    MergeEffects {
        competitors_replaced,
    }
}

/// Explicit name first, then "Home vs. Away", then the `""` sentinel. The
/// sentinel never overwrites a name already known for the locale.
fn merge_name(state: &mut MatchState, data: &SportEventData, locale: &Locale) {
    if let Some(name) = data.name.as_ref().filter(|name| !name.is_empty()) {
        state.names.insert(locale.clone(), name.clone());
        return;
    }

    if let Some(name) = versus_name(data) {
        state.names.insert(locale.clone(), name);
        return;
    }

    warn!(
        id = %data.id,
        locale = %locale,
        "No name and no competitor pair to build one from, storing empty name"
    );
    state.names.entry(locale.clone()).or_default();
}

fn versus_name(data: &SportEventData) -> Option<String> {
    match data.competitors.as_deref()? {
        [home, away] => {
            let home = home.name.as_deref().filter(|name| !name.is_empty())?;
            let away = away.name.as_deref().filter(|name| !name.is_empty())?;
            Some(format!("{home} vs. {away}"))
        }
        _ => None,
    }
}

fn merge_fixture(state: &mut MatchState, data: &FixtureData, locale: &Locale) -> MergeEffects {
    let effects = merge_sport_event(state, &data.sport_event, locale, true);

    state.fixture = Some(FixtureCi::from(data));

    if let Some(delayed) = &data.delayed_info {
        match &mut state.delayed_info {
            Some(existing) => existing.merge(delayed, locale),
            None => state.delayed_info = Some(DelayedInfoCi::new(delayed, locale)),
        }
    }

    replace_coverage(state, data.coverage_info.as_ref());
    effects
}

fn merge_summary(state: &mut MatchState, data: &SummaryData, locale: &Locale) -> MergeEffects {
    let effects = merge_sport_event(state, &data.sport_event, locale, false);
    merge_conditions(state, data.conditions.as_ref(), locale);
    replace_coverage(state, data.coverage_info.as_ref());
    effects
}

fn merge_timeline(state: &mut MatchState, data: &TimelineData, locale: &Locale) -> MergeEffects {
    let effects = merge_sport_event(state, &data.sport_event, locale, false);
    merge_conditions(state, data.conditions.as_ref(), locale);

    if let Some(timeline) = TimelineCi::from_data(data, locale) {
        state.timelines.insert(locale.clone(), timeline);
    }

    replace_coverage(state, data.coverage_info.as_ref());
    effects
}

fn merge_child_summary(state: &mut MatchState, data: &ChildEventData, locale: &Locale) {
    put_translation(&mut state.names, locale, data.name.as_ref());

    state.scheduled = data.scheduled;
    state.scheduled_end = data.scheduled_end;
    state.start_time_tbd = data.start_time_tbd;
    state.replaced_by.clone_from(&data.replaced_by);

    if data.stage_type.is_some() {
        state.stage_type = data.stage_type;
    }
    if data.event_type.is_some() {
        state.event_type = data.event_type;
    }
}

fn merge_conditions(state: &mut MatchState, data: Option<&ConditionsData>, locale: &Locale) {
    let Some(data) = data else {
        return;
    };

    match &mut state.conditions {
        Some(existing) => existing.merge(data, locale),
        None => state.conditions = Some(ConditionsCi::new(data, locale)),
    }
}

fn replace_coverage(state: &mut MatchState, data: Option<&CoverageInfoData>) {
    if let Some(data) = data {
        state.coverage_info = Some(CoverageInfoCi::from(data));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dto::{CompetitorData, DelayedInfoData, EventStatus, RoundData, TimelineEventData};

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    fn match_id() -> Urn {
        Urn::parse("sr:match:100").unwrap()
    }

    fn competitor(id: i64, name: &str, qualifier: &str) -> CompetitorData {
        CompetitorData {
            name: Some(name.to_string()),
            qualifier: Some(qualifier.to_string()),
            ..CompetitorData::new(Urn::new("sr", "competitor", id).unwrap())
        }
    }

    fn sport_event() -> SportEventData {
        SportEventData {
            competitors: Some(vec![
                competitor(1, "Team A", "home"),
                competitor(2, "Team B", "away"),
            ]),
            live_odds: Some("bookable".into()),
            ..SportEventData::new(match_id())
        }
    }

    #[test]
    fn test_name_built_from_competitors() {
        let mut state = MatchState::default();
        let effects = apply(&mut state, &Payload::SportEvent(sport_event()), &locale("en"));

        assert!(effects.competitors_replaced);
        assert_eq!(state.names[&locale("en")], "Team A vs. Team B");
    }

    #[test]
    fn test_explicit_name_wins() {
        let mut state = MatchState::default();
        let data = SportEventData {
            name: Some("Derby".into()),
            ..sport_event()
        };
        apply(&mut state, &Payload::SportEvent(data), &locale("en"));

        assert_eq!(state.names[&locale("en")], "Derby");
    }

    #[test]
    fn test_absent_name_stores_sentinel() {
        let mut state = MatchState::default();
        let effects = apply(
            &mut state,
            &Payload::Summary(SummaryData::new(SportEventData::new(match_id()))),
            &locale("de"),
        );

        assert!(!effects.competitors_replaced);
        assert_eq!(state.names.get(&locale("de")).map(String::as_str), Some(""));
        assert!(!state.names.contains_key(&locale("fr")));
    }

    #[test]
    fn test_sentinel_keeps_known_name() {
        let mut state = MatchState::default();
        apply(&mut state, &Payload::SportEvent(sport_event()), &locale("en"));
        apply(
            &mut state,
            &Payload::SportEvent(SportEventData::new(match_id())),
            &locale("en"),
        );

        assert_eq!(state.names[&locale("en")], "Team A vs. Team B");
    }

    #[test]
    fn test_booking_status_owned_by_fixture() {
        let mut state = MatchState::default();
        let fixture = FixtureData::new(SportEventData {
            live_odds: Some("booked".into()),
            ..SportEventData::new(match_id())
        });
        apply(&mut state, &Payload::Fixture(fixture), &locale("en"));
        assert_eq!(state.booking_status, Some(BookingStatus::Booked));

        // summary cannot downgrade it
        apply(
            &mut state,
            &Payload::Summary(SummaryData::new(sport_event())),
            &locale("en"),
        );
        assert_eq!(state.booking_status, Some(BookingStatus::Booked));

        // but a fixture can
        let fixture = FixtureData::new(SportEventData::new(match_id()));
        apply(&mut state, &Payload::Fixture(fixture), &locale("en"));
        assert_eq!(state.booking_status, Some(BookingStatus::NotAvailable));
    }

    #[test]
    fn test_booking_status_filled_when_unset() {
        let mut state = MatchState::default();
        apply(
            &mut state,
            &Payload::Summary(SummaryData::new(sport_event())),
            &locale("en"),
        );
        assert_eq!(state.booking_status, Some(BookingStatus::Bookable));
    }

    #[test]
    fn test_roster_replaced_not_unioned() {
        let mut state = MatchState::default();
        apply(&mut state, &Payload::SportEvent(sport_event()), &locale("en"));

        let replacement = SportEventData {
            competitors: Some(vec![competitor(3, "Team C", "home")]),
            ..SportEventData::new(match_id())
        };
        apply(&mut state, &Payload::SportEvent(replacement), &locale("en"));

        let roster = state.competitors.unwrap();
        assert_eq!(roster.ids(), &[Urn::parse("sr:competitor:3").unwrap()]);
        assert_eq!(roster.qualifiers().len(), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut data = FixtureData::new(SportEventData {
            tournament_round: Some(RoundData {
                name: Some("Round 1".into()),
                number: Some(1),
                ..RoundData::default()
            }),
            ..sport_event()
        });
        data.delayed_info = Some(DelayedInfoData {
            id: 4,
            description: Some("Weather".into()),
        });
        data.coverage_info = Some(CoverageInfoData {
            level: "gold".into(),
            live_coverage: true,
            ..CoverageInfoData::default()
        });
        let payload = Payload::Fixture(data);

        let mut once = MatchState::default();
        apply(&mut once, &payload, &locale("en"));
        let mut twice = once.clone();
        apply(&mut twice, &payload, &locale("en"));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_nested_items_carry_locale() {
        let mut state = MatchState::default();
        for (tag, name) in [("en", "Round 1"), ("de", "Runde 1")] {
            let data = SportEventData {
                tournament_round: Some(RoundData {
                    name: Some(name.into()),
                    ..RoundData::default()
                }),
                ..SportEventData::new(match_id())
            };
            apply(&mut state, &Payload::SportEvent(data), &locale(tag));
        }

        let round = state.tournament_round.unwrap();
        assert!(round.has_translations_for(&[locale("en"), locale("de")]));
        assert_eq!(round.name(&locale("de")), Some("Runde 1"));
    }

    #[test]
    fn test_timeline_stored_per_locale() {
        let mut state = MatchState::default();
        let mut data = TimelineData::new(SportEventData::new(match_id()));
        data.status = Some(EventStatus::Live);
        data.events = Some(vec![TimelineEventData {
            id: 1,
            event_type: "match_started".into(),
            time: None,
            match_time: None,
            match_clock: None,
            period_name: None,
            team: None,
            home_score: None,
            away_score: None,
            value: None,
        }]);
        apply(&mut state, &Payload::Timeline(data), &locale("en"));

        let timeline = &state.timelines[&locale("en")];
        assert!(!timeline.is_finalized());
        assert_eq!(timeline.events().len(), 1);
        assert!(!state.timelines.contains_key(&locale("de")));
    }

    #[test]
    fn test_child_summary() {
        let mut state = MatchState::default();
        let data = ChildEventData {
            id: match_id(),
            name: None,
            scheduled: None,
            scheduled_end: None,
            start_time_tbd: Some(true),
            replaced_by: None,
            stage_type: Some(StageType::Race),
            event_type: Some(SportEventType::Child),
        };
        apply(&mut state, &Payload::ChildSummary(data), &locale("en"));

        assert_eq!(state.names[&locale("en")], "");
        assert_eq!(state.start_time_tbd, Some(true));
        assert_eq!(state.stage_type, Some(StageType::Race));
        assert_eq!(state.event_type, Some(SportEventType::Child));
        assert!(state.booking_status.is_none());
    }
}
