//! End-to-end behaviour of a grid session over a caller-owned layout.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;
use tessel::layout::positions_overlap;
use tessel::prelude::*;
use tessel::{FlipAnimator, GridStats, capture_layout, get_grid_stats};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

fn dashboard() -> Vec<GridItem> {
    vec![
        GridItem::new("chat", GridPosition::new(0, 0, 8, 6)),
        GridItem::new("voice", GridPosition::new(8, 0, 4, 3)),
        GridItem::new("terminal", GridPosition::new(8, 3, 4, 3)),
        GridItem::new("files", GridPosition::new(0, 6, 12, 2)),
    ]
}

fn commit(items: &mut [GridItem], id: &str, position: GridPosition) {
    if let Some(item) = items.iter_mut().find(|item| item.id == id) {
        item.position = position;
    }
}

fn assert_disjoint(items: &[GridItem]) {
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            assert!(
                !positions_overlap(&a.position, &b.position),
                "{} overlaps {}",
                a.id,
                b.id
            );
        }
    }
}

#[test]
fn keyboard_session_moves_then_reports_once() {
    let mut items = dashboard();
    let moves = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&moves);
    let mut session = GridSession::new(GridConfig::default())
        .with_baseline(&items)
        .on_item_move(move |id, position| sink.borrow_mut().push((id.clone(), position)));
    let t0 = Instant::now();

    session.focus("files");
    session.handle_key(&items, &KeyEvent::new(KeyCode::Char('m')), t0);
    for step in 0..3u64 {
        let now = t0 + Duration::from_millis(20 * step);
        if let Some(SessionEvent::Moved { id, position }) =
            session.handle_key(&items, &KeyEvent::new(KeyCode::Down), now)
        {
            commit(&mut items, id.as_str(), position);
        }
    }
    session.handle_key(&items, &KeyEvent::new(KeyCode::Escape), t0 + Duration::from_millis(60));
    assert_eq!(session.keyboard().mode(), InteractionMode::Navigate);

    let deadline = session.next_deadline().expect("a notification is pending");
    session.poll(deadline + Duration::from_millis(200));

    assert_eq!(
        *moves.borrow(),
        vec![(ItemId::new("files"), GridPosition::new(0, 9, 12, 2))]
    );
    assert_disjoint(&items);
}

#[test]
fn compaction_closes_gaps_left_by_a_move() {
    let mut items = dashboard();
    let mut session = GridSession::new(GridConfig::default());
    let now = Instant::now();

    let pos = session
        .request_move(&items, "files", GridPosition::new(0, 20, 12, 2), now)
        .unwrap();
    commit(&mut items, "files", pos);

    let compacted = session.compact(&items);
    let files = compacted.iter().find(|item| item.id == "files").unwrap();
    assert_eq!(files.position.y, 6);
    assert_disjoint(&compacted);

    let stats: GridStats = get_grid_stats(&compacted);
    assert_eq!(stats.utilized_rows, 8);
    assert_eq!(stats.utilized_columns, 12);
    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["total_items"], 4);
    assert_eq!(json["density"], 1.0);
}

#[test]
fn committed_moves_animate_from_their_old_cells() {
    let mut items = dashboard();
    let metrics = CellMetrics::default();
    let mut session = GridSession::new(GridConfig::default());
    let mut animator = FlipAnimator::tweened();
    let now = Instant::now();

    let before = capture_layout(&items, &metrics);
    let pos = session
        .request_move(&items, "voice", GridPosition::new(8, 8, 4, 3), now)
        .unwrap();
    commit(&mut items, "voice", pos);
    let after = capture_layout(&items, &metrics);

    let batch = animator.animate_items(&before, &after);
    assert_eq!(batch.len(), 1);
    assert!(animator.is_animating("voice"));

    // Starts at the old rect, ends at rest.
    let start = animator.offset_of("voice");
    assert!(start.dy < 0.0);
    animator.tick(Duration::from_secs(1));
    assert!(!animator.is_animating("voice"));
}

struct TargetCapture(Arc<Mutex<Vec<String>>>);

impl<S> tracing_subscriber::Layer<S> for TargetCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.0
            .lock()
            .unwrap()
            .push(event.metadata().target().to_string());
    }
}

#[test]
fn session_logs_placement_and_delivery() {
    let targets = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(TargetCapture(Arc::clone(&targets)));

    tracing::subscriber::with_default(subscriber, || {
        let items = dashboard();
        let mut session = GridSession::new(GridConfig::default());
        let now = Instant::now();
        session.request_move(&items, "voice", GridPosition::new(0, 0, 4, 3), now);
        session.flush(now);
    });

    let targets = targets.lock().unwrap();
    assert!(targets.iter().any(|t| t == "tessel.session"));
    assert!(targets.iter().any(|t| t == "tessel.layout"));
    assert!(targets.iter().any(|t| t == "tessel.scheduler"));
}

#[test]
fn malformed_content_is_logged_and_dropped() {
    let targets = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(TargetCapture(Arc::clone(&targets)));

    let mut item = GridItem::with_content("notes", GridPosition::new(0, 0, 2, 2), vec![1u8, 2]);
    let result =
        tracing::subscriber::with_default(subscriber, || item.update_content_from_json("{oops"));

    assert!(result.is_err());
    assert_eq!(item.content, vec![1, 2]);
    assert_eq!(*targets.lock().unwrap(), vec!["tessel.item".to_string()]);
}

fn move_strategy() -> impl Strategy<Value = (usize, u16, u16)> {
    (0usize..4, 0u16..14, 0u16..14)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn committed_moves_keep_the_layout_disjoint(
        moves in prop::collection::vec(move_strategy(), 1..24),
    ) {
        let mut items = dashboard();
        let mut session = GridSession::new(GridConfig::default());
        let now = Instant::now();

        for (index, x, y) in moves {
            let id = items[index].id.clone();
            let target = items[index].position.with_origin(x, y);
            let pos = session.request_move(&items, id.as_str(), target, now);
            prop_assert!(pos.is_some());
            if let Some(pos) = pos {
                prop_assert!(pos.right() <= 12);
                commit(&mut items, id.as_str(), pos);
            }
        }
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                prop_assert!(!positions_overlap(&a.position, &b.position));
            }
        }
    }
}
