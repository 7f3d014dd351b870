//! End-to-end tests for the command engine over an in-memory transport.
//!
//! These exercise full cycles (bytes in, status line out) with emphasis on
//! streaming behavior: commands split across service calls, several commands
//! in one drain, and recovery after every failure path.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use atline_engine::{
    AtEngine, CommandKind, CommandSpec, Context, EngineConfig, EngineError, MemoryTransport,
};

/// Helper: a `+PING` table whose RUN handler counts invocations.
fn counting_ping() -> (Vec<CommandSpec>, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    let hits = count.clone();
    let commands = vec![CommandSpec::new("+PING").on_run(move |_| {
        hits.set(hits.get() + 1);
        true
    })];
    (commands, count)
}

fn engine_for(commands: &[CommandSpec]) -> AtEngine<'_, MemoryTransport> {
    AtEngine::with_transport(commands, EngineConfig::default(), MemoryTransport::new())
}

fn feed(engine: &mut AtEngine<'_, MemoryTransport>, bytes: &[u8]) {
    engine
        .transport_mut()
        .expect("transport attached")
        .feed(bytes);
}

fn take_output(engine: &mut AtEngine<'_, MemoryTransport>) -> Vec<u8> {
    engine
        .transport_mut()
        .expect("transport attached")
        .take_output()
}

// ============================================================================
// Dispatch Scenarios
// ============================================================================

#[test]
fn test_run_command_dispatches_exactly_once() {
    let (commands, count) = counting_ping();
    let mut engine = engine_for(&commands);

    feed(&mut engine, b"AT+PING\r\n");
    assert_eq!(engine.service(), Ok(()));
    assert_eq!(take_output(&mut engine), b"OK\r\n");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_unregistered_command_rejected() {
    let (commands, count) = counting_ping();
    let mut engine = engine_for(&commands);

    feed(&mut engine, b"AT+PONG\r\n");
    assert_eq!(
        engine.service(),
        Err(EngineError::UnknownCommand {
            name: "+PONG".to_string(),
            kind: CommandKind::Run,
        })
    );
    assert_eq!(take_output(&mut engine), b"ERROR\r\n");
    assert_eq!(count.get(), 0);
}

#[test]
fn test_missing_prefix_never_dispatches() {
    let (commands, count) = counting_ping();
    let mut engine = engine_for(&commands);

    for line in [&b"PING\r\n"[..], &b"BT+PING\r\n"[..]] {
        feed(&mut engine, line);
        assert!(matches!(
            engine.service(),
            Err(EngineError::Syntax { .. })
        ));
        assert_eq!(take_output(&mut engine), b"ERROR\r\n");
    }
    assert_eq!(count.get(), 0);
}

#[test]
fn test_write_command_tokenizes_parameters() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let exhausted = Rc::new(Cell::new(false));
    let tokens = seen.clone();
    let done = exhausted.clone();
    let commands = vec![CommandSpec::new("+SET").on_write(move |ctx: &mut Context| {
        while let Some(token) = ctx.next() {
            tokens.borrow_mut().push(token.to_string());
        }
        // Exhaustion is terminal: further pulls stay empty.
        done.set(!ctx.has_next() && ctx.next().is_none());
        true
    })];
    let mut engine = engine_for(&commands);

    feed(&mut engine, b"AT+SET=5,7\r\n");
    assert_eq!(engine.service(), Ok(()));
    assert_eq!(take_output(&mut engine), b"OK\r\n");
    assert_eq!(*seen.borrow(), vec!["5".to_string(), "7".to_string()]);
    assert!(exhausted.get());
}

#[test]
fn test_bare_terminator_is_acknowledged_noop() {
    let (commands, count) = counting_ping();
    let mut engine = engine_for(&commands);

    feed(&mut engine, b"\r\n");
    assert_eq!(engine.service(), Ok(()));
    assert_eq!(take_output(&mut engine), b"OK\r\n");
    assert_eq!(count.get(), 0);
}

// ============================================================================
// Streaming Behavior
// ============================================================================

#[test]
fn test_single_byte_delivery_matches_bulk() {
    let (commands, count) = counting_ping();
    let mut engine = engine_for(&commands);

    for &byte in b"AT+PING\r\n" {
        feed(&mut engine, &[byte]);
        assert_eq!(engine.service(), Ok(()));
    }
    assert_eq!(take_output(&mut engine), b"OK\r\n");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_every_split_point_matches_bulk() {
    let input = b"AT+SET=5,7\r\n";
    for split in 0..=input.len() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let tokens = seen.clone();
        let commands = vec![CommandSpec::new("+SET").on_write(move |ctx: &mut Context| {
            while let Some(token) = ctx.next() {
                tokens.borrow_mut().push(token.to_string());
            }
            true
        })];
        let mut engine = engine_for(&commands);

        feed(&mut engine, &input[..split]);
        assert_eq!(engine.service(), Ok(()), "split at {split}");
        feed(&mut engine, &input[split..]);
        assert_eq!(engine.service(), Ok(()), "split at {split}");

        assert_eq!(take_output(&mut engine), b"OK\r\n", "split at {split}");
        assert_eq!(*seen.borrow(), vec!["5".to_string(), "7".to_string()]);
    }
}

#[test]
fn test_multiple_commands_in_one_drain() {
    let (commands, count) = counting_ping();
    let mut engine = engine_for(&commands);

    feed(&mut engine, b"AT+PING\r\nAT+PING\r\n");
    assert_eq!(engine.service(), Ok(()));
    assert_eq!(take_output(&mut engine), b"OK\r\nOK\r\n");
    assert_eq!(count.get(), 2);
}

#[test]
fn test_failed_cycle_leaves_rest_for_next_call() {
    let (commands, count) = counting_ping();
    let mut engine = engine_for(&commands);

    feed(&mut engine, b"AT+PONG\r\nAT+PING\r\n");

    // First call stops at the unknown command.
    assert!(matches!(
        engine.service(),
        Err(EngineError::UnknownCommand { .. })
    ));
    assert_eq!(take_output(&mut engine), b"ERROR\r\n");

    // Second call picks up the queued bytes and completes the valid command.
    assert_eq!(engine.service(), Ok(()));
    assert_eq!(take_output(&mut engine), b"OK\r\n");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_repeated_cr_before_terminator() {
    let (commands, count) = counting_ping();
    let mut engine = engine_for(&commands);

    // The terminator match resets at the repeated CR, then completes.
    feed(&mut engine, b"AT+PING\r\r\n");
    assert_eq!(engine.service(), Ok(()));
    assert_eq!(take_output(&mut engine), b"OK\r\n");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_lf_only_terminator() {
    let (commands, count) = counting_ping();
    let config = EngineConfig {
        terminator: vec![b'\n'],
        ..EngineConfig::default()
    };
    let mut engine = AtEngine::with_transport(&commands, config, MemoryTransport::new());

    feed(&mut engine, b"AT+PING\n");
    assert_eq!(engine.service(), Ok(()));
    assert_eq!(take_output(&mut engine), b"OK\r\n");
    assert_eq!(count.get(), 1);
}

// ============================================================================
// Failure Recovery
// ============================================================================

#[test]
fn test_overflow_then_recovery() {
    let (commands, count) = counting_ping();
    let config = EngineConfig {
        capacity: 8,
        ..EngineConfig::default()
    };
    let mut engine = AtEngine::with_transport(&commands, config, MemoryTransport::new());

    feed(&mut engine, b"AT+TOOLONGCOMMAND\r\n");

    // The flood overflows the 8-byte buffer; each discarded fragment is a
    // failed cycle of its own.
    assert_eq!(
        engine.service(),
        Err(EngineError::BufferOverflow { capacity: 8 })
    );
    assert_eq!(
        engine.service(),
        Err(EngineError::BufferOverflow { capacity: 8 })
    );
    assert_eq!(engine.service(), Ok(()));
    assert_eq!(take_output(&mut engine), b"ERROR\r\nERROR\r\n");
    assert_eq!(engine.buffered_len(), 0);

    // A subsequent valid command parses normally.
    feed(&mut engine, b"AT+PING\r\n");
    assert_eq!(engine.service(), Ok(()));
    assert_eq!(take_output(&mut engine), b"OK\r\n");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_buffer_clean_after_every_outcome() {
    let commands = vec![
        CommandSpec::new("+PING").on_run(|_| true),
        CommandSpec::new("+FAIL").on_run(|_| false),
    ];
    let mut engine = engine_for(&commands);

    let cases: [&[u8]; 4] = [
        b"AT+PING\r\n",  // success
        b"AT+FAIL\r\n",  // handler failure
        b"AT+NOPE\r\n",  // unknown command
        b"GARBAGE\r\n",  // syntax rejection
    ];
    for line in cases {
        feed(&mut engine, line);
        let _ = engine.service();
        assert_eq!(engine.buffered_len(), 0, "after {:?}", line);
    }

    // The engine still works after the full gauntlet.
    feed(&mut engine, b"AT+PING\r\n");
    assert_eq!(engine.service(), Ok(()));
    assert!(take_output(&mut engine).ends_with(b"OK\r\n"));
}
