use crate::CommandEvent;

/// WHAT: Wire names parse back to the same event
/// WHY: Poster and subscriber live in different processes
#[test]
fn given_event_names_when_parsing_then_events_match() {
    // Given/When/Then: Both events survive a trip through their wire name
    for event in [CommandEvent::StartRecording, CommandEvent::StopRecording] {
        assert_eq!(CommandEvent::from_name(event.name()), Some(event));
    }
}

/// WHAT: Foreign names are rejected
/// WHY: Stray datagrams must not trigger transitions
#[test]
fn given_unknown_name_when_parsing_then_none() {
    // Given: A name outside the recorder namespace
    let name = "com.example.other.startRecording";

    // When: Parsing it
    let event = CommandEvent::from_name(name);

    // Then: No event
    assert!(event.is_none());
}
