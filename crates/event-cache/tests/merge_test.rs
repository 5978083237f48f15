//! Merging payloads into items through the public surface.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::{MockLoader, cache_with, competitor, locale, match_urn, sport_event};
use event_cache::ci::BookingStatus;
use event_cache::dto::{
    ConditionsData, CoverageInfoData, DelayedInfoData, RoundData, SeasonData, VenueData,
};
use event_cache::prelude::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn roster_payload(id: &Urn, competitors: Vec<event_cache::dto::CompetitorData>) -> Payload {
    Payload::Summary(SummaryData::new(SportEventData {
        competitors: Some(competitors),
        ..SportEventData::new(id.clone())
    }))
}

#[test]
fn test_roster_is_replaced_not_unioned() {
    let loader = Arc::new(MockLoader::summaries());
    let cache = cache_with(&loader, ExceptionHandlingStrategy::Throw);
    let id = match_urn(20);
    let en = locale("en");

    let first = roster_payload(
        &id,
        vec![competitor(1, "Team A", "home"), competitor(2, "Team B", "away")],
    );
    let item = cache.add_payload(&id, first, &en).unwrap();

    let mut second_home = competitor(3, "Team C", "home");
    second_home.division = Some(2);
    let second = roster_payload(&id, vec![second_home]);
    cache.add_payload(&id, second, &en).unwrap();

    let competitor_3 = Urn::parse("sr:competitor:3").unwrap();
    assert_eq!(
        item.competitor_ids(&[en.clone()]).unwrap(),
        Some(vec![competitor_3.clone()])
    );
    assert_eq!(item.competitors_qualifiers().unwrap().len(), 1);
    assert_eq!(
        item.competitors_divisions().unwrap().get(&competitor_3),
        Some(&2)
    );
    assert_eq!(loader.call_count(), 0);
}

#[test]
fn test_merging_twice_is_idempotent() {
    let loader = Arc::new(MockLoader::summaries());
    let cache = cache_with(&loader, ExceptionHandlingStrategy::Throw);
    let id = match_urn(21);
    let en = locale("en");

    let mut summary = SummaryData::new(SportEventData {
        tournament_round: Some(RoundData {
            name: Some("Quarterfinal".into()),
            cup_round_matches: Some(2),
            cup_round_match_number: Some(1),
            ..RoundData::default()
        }),
        season: Some(SeasonData {
            id: Urn::parse("sr:season:77").unwrap(),
            name: Some("Cup 2026".into()),
            start_date: None,
            end_date: None,
            year: Some("2026".into()),
            tournament_id: None,
        }),
        ..sport_event(&id, &en)
    });
    summary.conditions = Some(ConditionsData {
        attendance: Some("40000".into()),
        ..ConditionsData::default()
    });
    summary.coverage_info = Some(CoverageInfoData {
        level: "gold".into(),
        live_coverage: true,
        ..CoverageInfoData::default()
    });
    let payload = Payload::Summary(summary);

    let item = cache.add_payload(&id, payload.clone(), &en).unwrap();
    let once = item.export();
    item.merge(payload, &en).unwrap();
    let twice = item.export();

    assert_eq!(once, twice);
}

#[test]
fn test_malformed_payload_leaves_item_untouched() {
    let loader = Arc::new(MockLoader::summaries());
    let cache = cache_with(&loader, ExceptionHandlingStrategy::Throw);
    let id = match_urn(22);
    let en = locale("en");

    let item = cache
        .add_payload(&id, common::summary_payload(&id, &en), &en)
        .unwrap();
    let before = item.export();

    let duplicated = roster_payload(
        &id,
        vec![competitor(1, "Team A", "home"), competitor(1, "Team A", "away")],
    );
    let result = item.merge(duplicated, &locale("de"));
    assert!(matches!(result, Err(CacheError::Malformed(_))));

    let foreign = common::summary_payload(&match_urn(99), &en);
    assert!(matches!(
        cache.add_payload(&id, foreign, &en),
        Err(CacheError::Malformed(_))
    ));

    assert_eq!(item.export(), before);
    assert!(cache.get(&match_urn(99)).is_none());
}

#[test]
fn test_booking_status_precedence() {
    let loader = Arc::new(MockLoader::summaries());
    let cache = cache_with(&loader, ExceptionHandlingStrategy::Throw);
    let id = match_urn(23);
    let en = locale("en");

    // summary fills the unset status
    let item = cache
        .add_payload(&id, common::summary_payload(&id, &en), &en)
        .unwrap();
    assert_eq!(item.booking_status().unwrap(), Some(BookingStatus::Bookable));

    // fixture owns it
    let fixture = FixtureData::new(SportEventData {
        live_odds: Some("not_available".into()),
        ..SportEventData::new(id.clone())
    });
    item.merge(Payload::Fixture(fixture), &en).unwrap();
    assert_eq!(
        item.booking_status().unwrap(),
        Some(BookingStatus::NotAvailable)
    );

    // a later summary cannot change it back
    item.merge(common::summary_payload(&id, &en), &en).unwrap();
    assert_eq!(
        item.booking_status().unwrap(),
        Some(BookingStatus::NotAvailable)
    );

    item.on_event_booked();
    assert_eq!(item.booking_status().unwrap(), Some(BookingStatus::Booked));
    assert_eq!(loader.call_count(), 0);
}

#[test]
fn test_nested_items_fetch_missing_translations() {
    let loader = Arc::new(MockLoader::new(|_, locale, id| {
        let venue = VenueData {
            id: Urn::parse("sr:venue:5").unwrap(),
            name: Some(format!("Stadium ({locale})")),
            city_name: Some(format!("City ({locale})")),
            country_name: None,
            capacity: Some(50_000),
            country_code: Some("DEU".into()),
            map_coordinates: None,
            state: None,
        };
        Payload::Summary(SummaryData::new(SportEventData {
            venue: Some(venue),
            ..sport_event(id, locale)
        }))
    }));
    let cache = cache_with(&loader, ExceptionHandlingStrategy::Throw);
    let item = cache.get_or_create(&match_urn(24));
    let (en, de) = (locale("en"), locale("de"));

    let venue = item.venue(&[en.clone()]).unwrap().expect("venue");
    assert_eq!(venue.name(&en), Some("Stadium (en)"));
    assert_eq!(venue.name(&de), None);

    let venue = item.venue(&[en.clone(), de.clone()]).unwrap().expect("venue");
    assert_eq!(venue.city_name(&de), Some("City (de)"));
    assert_eq!(venue.capacity(), Some(50_000));
    assert_eq!(loader.call_count(), 2);

    // venue holds both locales, no further fetch
    item.venue(&[de]).unwrap();
    assert_eq!(loader.call_count(), 2);
}

#[test]
fn test_fixture_payload_fills_fixture_accessors() {
    let loader = Arc::new(MockLoader::summaries());
    let cache = cache_with(&loader, ExceptionHandlingStrategy::Throw);
    let id = match_urn(25);
    let en = locale("en");

    let mut fixture = FixtureData::new(sport_event(&id, &en));
    fixture.start_time_confirmed = Some(true);
    fixture.references.insert("betradar".into(), "123".into());
    fixture.delayed_info = Some(DelayedInfoData {
        id: 3,
        description: Some("Floodlight failure".into()),
    });
    let item = cache.add_payload(&id, Payload::Fixture(fixture), &en).unwrap();

    let view = item.fixture(&[en.clone()]).unwrap().expect("fixture");
    assert_eq!(view.start_time_confirmed, Some(true));
    assert_eq!(view.references["betradar"], "123");

    let delayed = item.delayed_info(&[en.clone()]).unwrap().expect("delayed info");
    assert_eq!(delayed.description(&en), Some("Floodlight failure"));

    assert!(!item.has_translations_loaded_for(&[en.clone()]));
    assert_eq!(item.competitor_ids(&[en.clone()]).unwrap().map(|ids| ids.len()), Some(2));
    assert_eq!(loader.call_count(), 0);

    item.names(&[en.clone()]).unwrap();
    item.conditions(&[en.clone()]).unwrap();
    assert!(item.has_translations_loaded_for(&[en]));
    assert_eq!(loader.call_count(), 1);
}

#[test]
fn test_child_summary_creates_item() {
    let loader = Arc::new(MockLoader::summaries());
    let cache = cache_with(&loader, ExceptionHandlingStrategy::Throw);
    let id = Urn::parse("sr:stage:30").unwrap();
    let en = locale("en");

    let child = ChildEventData {
        id: id.clone(),
        name: None,
        scheduled: Some("2026-07-04T12:00:00Z".parse().unwrap()),
        scheduled_end: Some("2026-07-04T14:00:00Z".parse().unwrap()),
        start_time_tbd: None,
        replaced_by: None,
        stage_type: Some(event_cache::dto::StageType::Race),
        event_type: Some(event_cache::dto::SportEventType::Child),
    };
    let item = cache.add_payload(&id, Payload::ChildSummary(child), &en).unwrap();

    assert_eq!(cache.len(), 1);
    assert_eq!(item.scheduled_raw(), Some("2026-07-04T12:00:00Z".parse().unwrap()));
    assert_eq!(item.scheduled_end_raw(), Some("2026-07-04T14:00:00Z".parse().unwrap()));
    assert_eq!(item.export().names.get(&en).map(String::as_str), Some(""));
    assert!(item.loaded_locales(RequestClass::Summary).is_empty());
}
