//! Demo command table served by the reference runner.
//!
//! A small but representative set:
//!
//! - `AT` - bare probe, always succeeds
//! - `AT+PING` - liveness check
//! - `AT+VER?` - runner version
//! - `AT+NAME?` / `AT+NAME=<text>` / `AT+NAME=?` - stateful get/set
//! - `AT+ECHO=<t1>,<t2>,...` - echoes each parameter token back as a line

use std::cell::RefCell;
use std::rc::Rc;

use atline_engine::{CommandSpec, Context};

/// Build the demo command table.
pub fn demo_commands() -> Vec<CommandSpec> {
    let node_name = Rc::new(RefCell::new(String::from("atline")));
    let read_name = node_name.clone();
    let write_name = node_name;

    vec![
        // Bare `AT` probe.
        CommandSpec::new("").on_run(|_| true),
        CommandSpec::new("+PING").on_run(|_| true),
        CommandSpec::new("+VER").on_read(|ctx: &mut Context| {
            ctx.write_line(concat!("+VER: ", env!("CARGO_PKG_VERSION")));
            true
        }),
        CommandSpec::new("+NAME")
            .on_read(move |ctx: &mut Context| {
                let line = format!("+NAME: {}", read_name.borrow());
                ctx.write_line(&line);
                true
            })
            .on_write(move |ctx: &mut Context| match ctx.next() {
                Some(name) if !name.is_empty() => {
                    *write_name.borrow_mut() = name.to_string();
                    true
                }
                _ => false,
            })
            .on_test(|ctx: &mut Context| {
                ctx.write_line("+NAME: <text>");
                true
            }),
        CommandSpec::new("+ECHO").on_write(|ctx: &mut Context| {
            while let Some(token) = ctx.next() {
                ctx.write_line(token);
            }
            true
        }),
    ]
}
