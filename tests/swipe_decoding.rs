use std::{sync::Arc, thread, time::Duration};

use swipetype::{
    compose::{Composer, Edit},
    layout::Rect,
    stream::{
        classify, map_path, Gesture, GestureCapture, PointerEvent, PointerId, PointerPhase,
        PointerSample,
    },
    Dictionary, KeyCap, KeyOutput, KeySequence, Keyboard, KeyboardLayout, LayoutVariant,
    WordScorer,
};

const WIDTH: f32 = 1000.0;
const HEIGHT: f32 = 400.0;

fn center(layout: &KeyboardLayout, c: char) -> (f32, f32) {
    let Rect { x, y, width, height } = layout.find(KeyCap::Char(c)).unwrap().bounds;
    (x + width / 2.0, y + height / 2.0)
}

/// Pointer events tracing straight lines between the centres of `word`'s keys.
fn trace(layout: &KeyboardLayout, word: &str, steps: usize) -> Vec<PointerEvent> {
    let points: Vec<(f32, f32)> = word.chars().map(|c| center(layout, c)).collect();
    let mut events = Vec::new();
    let mut t = 0;
    let mut push = |phase, (x, y): (f32, f32)| {
        t += 8;
        events.push(PointerEvent::new(
            PointerId(7),
            phase,
            PointerSample::new(x, y, Duration::from_millis(t)),
        ));
    };

    push(PointerPhase::Down, points[0]);
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        for step in 1..=steps {
            let f = step as f32 / steps as f32;
            push(PointerPhase::Move, (x0 + (x1 - x0) * f, y0 + (y1 - y0) * f));
        }
    }
    push(PointerPhase::Up, points[points.len() - 1]);
    events
}

fn keyboard(dictionary: Dictionary) -> Keyboard {
    Keyboard::new(WIDTH, HEIGHT, Arc::new(dictionary), WordScorer::default()).unwrap()
}

fn run(keyboard: &mut Keyboard, events: Vec<PointerEvent>) -> Vec<KeyOutput> {
    events.into_iter().filter_map(|e| keyboard.handle(e)).collect()
}

#[test]
fn test_swiping_hello_over_the_keys_types_hello() {
    let layout = KeyboardLayout::standard(LayoutVariant::Lowercase, WIDTH, HEIGHT).unwrap();
    let mut kb = keyboard(Dictionary::from_words(["hi", "hello"]));

    let outputs = run(&mut kb, trace(&layout, "helo", 6));
    assert_eq!(outputs, vec![KeyOutput::Word("hello".to_string())]);
}

#[test]
fn test_traced_path_maps_to_crossed_letters_in_order() {
    let layout = KeyboardLayout::standard(LayoutVariant::Lowercase, WIDTH, HEIGHT).unwrap();
    let mut capture = GestureCapture::new();
    let gesture = trace(&layout, "the", 4)
        .into_iter()
        .find_map(|e| capture.handle(e, &layout))
        .unwrap();

    let sequence = map_path(&gesture.path, &layout);
    // Straight lines cross intermediate keys; the ends are fixed
    assert_eq!(sequence.first(), Some('t'));
    assert_eq!(sequence.last(), Some('e'));
    assert!(sequence.keys().windows(2).all(|w| w[0] != w[1]));
    assert!(matches!(classify(&gesture, &layout), Gesture::Swipe(_)));
}

#[test]
fn test_jitter_over_one_key_is_a_tap() {
    let layout = KeyboardLayout::standard(LayoutVariant::Lowercase, WIDTH, HEIGHT).unwrap();
    let (x, y) = center(&layout, 'a');
    let mut kb = keyboard(Dictionary::builtin());

    let mut events = vec![PointerEvent::new(
        PointerId(1),
        PointerPhase::Down,
        PointerSample::new(x, y, Duration::ZERO),
    )];
    for i in 1..30u64 {
        let wobble = if i % 2 == 0 { 12.0 } else { -12.0 };
        events.push(PointerEvent::new(
            PointerId(1),
            PointerPhase::Move,
            PointerSample::new(x + wobble, y - wobble / 2.0, Duration::from_millis(i * 5)),
        ));
    }
    events.push(PointerEvent::new(
        PointerId(1),
        PointerPhase::Up,
        PointerSample::new(x, y, Duration::from_millis(200)),
    ));

    assert_eq!(run(&mut kb, events), vec![KeyOutput::Char('a')]);
}

#[test]
fn test_swipe_without_candidates_inserts_nothing() {
    let layout = KeyboardLayout::standard(LayoutVariant::Lowercase, WIDTH, HEIGHT).unwrap();

    let mut empty = keyboard(Dictionary::from_words(Vec::<&str>::new()));
    assert!(run(&mut empty, trace(&layout, "helo", 3)).is_empty());

    let mut no_h = keyboard(Dictionary::from_words(["world", "zebra"]));
    assert!(run(&mut no_h, trace(&layout, "helo", 3)).is_empty());
}

#[test]
fn test_builtin_dictionary_decodes_common_words() {
    let scorer = WordScorer::default();
    let dict = Dictionary::builtin();
    for (keys, expected) in [
        ("helo", "hello"),
        ("the", "the"),
        ("swipe", "swipe"),
        ("keyboard", "keyboard"),
        ("thanks", "thanks"),
    ] {
        let word = scorer.best_match(&KeySequence::from(keys), &dict);
        assert_eq!(word, Some(expected), "decoding {}", keys);
    }
}

#[test]
fn test_scorer_is_shareable_across_threads() {
    let dict = Arc::new(Dictionary::builtin());
    let scorer = WordScorer::default();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dict = Arc::clone(&dict);
            thread::spawn(move || {
                scorer
                    .best_match(&KeySequence::from("world"), &dict)
                    .map(str::to_string)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("world"));
    }
}

#[test]
fn test_composed_message_from_taps_and_swipes() {
    let layout = KeyboardLayout::standard(LayoutVariant::Lowercase, WIDTH, HEIGHT).unwrap();
    let mut kb = keyboard(Dictionary::builtin());
    let mut composer = Composer::new();

    let mut outputs = run(&mut kb, trace(&layout, "helo", 5));
    outputs.extend(run(&mut kb, trace(&layout, "wprld", 5)));

    let send = kb.active_layout().find(KeyCap::Send).unwrap().bounds;
    let (sx, sy) = (send.x + 1.0, send.y + 1.0);
    for phase in [PointerPhase::Down, PointerPhase::Up] {
        let sample = PointerSample::new(sx, sy, Duration::from_secs(1));
        outputs.extend(kb.handle(PointerEvent::new(PointerId(0), phase, sample)));
    }

    let edits: Vec<Edit> = outputs.iter().filter_map(|o| composer.apply(o)).collect();
    assert_eq!(edits.last(), Some(&Edit::Submit("hello world".to_string())));
}

#[test]
fn test_accepted_suggestion_replaces_message() {
    let layout = KeyboardLayout::standard(LayoutVariant::Lowercase, WIDTH, HEIGHT).unwrap();
    let mut kb = keyboard(Dictionary::builtin());
    let mut composer = Composer::new();

    for output in run(&mut kb, trace(&layout, "helo", 5)) {
        composer.apply(&output);
    }
    assert_eq!(composer.text(), "hello");

    let edit = composer.accept("Hello, how are you?");
    assert_eq!(
        edit,
        Edit::Replace {
            erase: 5,
            text: "Hello, how are you?".to_string(),
        }
    );
    assert_eq!(
        composer.apply(&KeyOutput::Send),
        Some(Edit::Submit("Hello, how are you?".to_string()))
    );
}
