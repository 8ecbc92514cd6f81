//! Debounce and response-ordering behavior of the entity search
//! controller, on paused Tokio time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fieldrep_core::search::{
    EntitySearchController, EntitySource, ResponseOrdering, SearchConfig,
};
use fieldrep_core::{FieldRepApi, PeopleLists, RequestError, RequestPipeline, Session, SessionContext};
use fieldrep_store::models::PersonKind;
use fieldrep_test_utils::ScriptedTransport;
use fieldrep_test_utils::fixtures::{self, COMPANY_ID, TOKEN};

fn api_search() -> (Arc<ScriptedTransport>, EntitySearchController) {
    let transport = Arc::new(ScriptedTransport::new());
    let session = Arc::new(SessionContext::with_session(Session::new(TOKEN, COMPANY_ID)));
    let api = FieldRepApi::new(RequestPipeline::new(transport.clone(), session));
    (transport, EntitySearchController::new(Arc::new(api)))
}

#[tokio::test(start_paused = true)]
async fn burst_of_keystrokes_issues_one_search_for_the_last_text() {
    let (transport, search) = api_search();
    transport.push_data(fixtures::search_data(
        &[fixtures::doctor(101, "Dr. Docherty")],
        &[],
    ));

    for text in ["d", "do", "doc"] {
        search.on_query_change(text);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(transport.call_count(), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(transport.call_count(), 1);
    let request = transport.last_request().unwrap();
    assert_eq!(request.variables()["search"], "doc");

    let state = search.state();
    assert!(!state.loading);
    assert!(state.results_visible);
    assert_eq!(state.results.doctors[0].profile.id, 101);
}

#[tokio::test(start_paused = true)]
async fn pauses_longer_than_debounce_search_each_time() {
    let (transport, search) = api_search();
    transport.push_data(fixtures::search_data(&[], &[]));
    transport.push_data(fixtures::search_data(&[], &[fixtures::chemist(301, "Mehta")]));

    search.on_query_change("me");
    tokio::time::sleep(Duration::from_millis(600)).await;
    search.on_query_change("meh");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(transport.call_count(), 2);
    let picked = search.select(PersonKind::Chemist, 301).unwrap();
    assert_eq!(picked.name(), "Mehta");
}

#[tokio::test(start_paused = true)]
async fn watchers_see_loading_then_results() {
    let (transport, search) = api_search();
    transport.push_data(fixtures::search_data(&[fixtures::doctor(1, "Asha")], &[]));
    let mut rx = search.subscribe();

    search.on_query_change("asha");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.query, "asha");
    assert!(!state.loading);
    assert_eq!(state.results.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_tenant_shows_an_error_not_a_spinner() {
    let transport = Arc::new(ScriptedTransport::new());
    let session = Arc::new(SessionContext::new());
    let api = FieldRepApi::new(RequestPipeline::new(transport.clone(), session));
    let search = EntitySearchController::new(Arc::new(api));

    search.on_query_change("asha");
    tokio::time::sleep(Duration::from_millis(600)).await;

    let state = search.state();
    assert!(!state.loading);
    assert!(state.error.is_some());
    assert_eq!(transport.call_count(), 0);
}

// ---------------------------------------------------------------------------
// Overlapping responses
// ---------------------------------------------------------------------------

/// Answers each query after a per-query delay with one doctor whose id is
/// the query length.
struct DelayedSource {
    delays: HashMap<&'static str, Duration>,
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl EntitySource for DelayedSource {
    async fn search_people(&self, text: &str) -> Result<PeopleLists, RequestError> {
        self.seen.lock().unwrap().push(text.to_string());
        let delay = self.delays.get(text).copied().unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(PeopleLists {
            doctors: vec![fixtures::doctor(text.len() as i64, text)],
            chemists: vec![],
        })
    }
}

fn delayed() -> Arc<DelayedSource> {
    Arc::new(DelayedSource {
        delays: HashMap::from([
            ("slow", Duration::from_millis(2000)),
            ("faster", Duration::from_millis(10)),
        ]),
        seen: Mutex::new(Vec::new()),
    })
}

/// "slow" is searched first and answers last.
async fn race(search: &EntitySearchController) {
    search.on_query_change("slow");
    tokio::time::sleep(Duration::from_millis(600)).await;
    search.on_query_change("faster");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(search.state().loading, "slow search should still be running");
    tokio::time::sleep(Duration::from_millis(2000)).await;
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_discarded_by_default() {
    let source = delayed();
    let search = EntitySearchController::new(source.clone());

    race(&search).await;

    let state = search.state();
    assert_eq!(state.results.doctors[0].profile.name, "faster");
    assert!(!state.loading);
    assert_eq!(source.seen.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn last_arrival_ordering_lets_the_stale_response_win() {
    let source = delayed();
    let search = EntitySearchController::with_config(
        source,
        SearchConfig {
            ordering: ResponseOrdering::LastArrival,
            ..SearchConfig::default()
        },
    );

    race(&search).await;

    assert_eq!(search.state().results.doctors[0].profile.name, "slow");
}

#[tokio::test(start_paused = true)]
async fn clearing_the_query_discards_the_in_flight_response() {
    let source = delayed();
    let search = EntitySearchController::new(source);

    search.on_query_change("slow");
    tokio::time::sleep(Duration::from_millis(600)).await;
    search.on_query_change("");
    tokio::time::sleep(Duration::from_millis(3000)).await;

    let state = search.state();
    assert!(state.results.is_empty());
    assert!(!state.results_visible);
    assert!(!state.loading);
}

fn last_arrival(source: Arc<DelayedSource>) -> EntitySearchController {
    EntitySearchController::with_config(
        source,
        SearchConfig {
            ordering: ResponseOrdering::LastArrival,
            ..SearchConfig::default()
        },
    )
}

#[tokio::test(start_paused = true)]
async fn last_arrival_still_drops_responses_from_before_a_clear() {
    let search = last_arrival(delayed());

    search.on_query_change("slow");
    tokio::time::sleep(Duration::from_millis(600)).await;
    search.on_query_change("s");
    tokio::time::sleep(Duration::from_millis(3000)).await;

    let state = search.state();
    assert!(state.results.is_empty());
    assert!(!state.results_visible);
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn last_arrival_does_not_reopen_results_after_a_pick() {
    let search = last_arrival(delayed());

    search.on_query_change("slow");
    tokio::time::sleep(Duration::from_millis(600)).await;
    search.on_query_change("faster");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(search.state().results_visible);

    let picked = search.select(PersonKind::Doctor, 6).unwrap();
    assert_eq!(picked.name(), "faster");
    tokio::time::sleep(Duration::from_millis(2000)).await;

    let state = search.state();
    assert_eq!(state.query, "");
    assert!(state.results.is_empty());
    assert!(!state.results_visible);
    assert!(!state.loading);
}
