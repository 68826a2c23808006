//! Performance benchmarks for the hot paths of the board server

use server::board::{Board, NoteFilter};
use server::command::Command;
use server::protocol::ProtocolHandler;
use shared::{BoardConfig, Note, Pin, ResponseHeader};
use std::sync::Arc;
use std::time::Instant;

/// Large board with small notes, so grid positions never overlap
fn wide_board() -> Board {
    Board::new(BoardConfig::new(10_000, 10_000, 8, 8, ["yellow", "blue"]).unwrap())
}

async fn fill(board: &Board, count: i64) {
    for i in 0..count {
        let color = if i % 2 == 0 { "yellow" } else { "blue" };
        let note = board.make_note((i % 100) * 10, (i / 100) * 10, color, "benchmark note");
        board.add_note(note).await.unwrap();
    }
}

/// Benchmarks parsing of every verb
#[test]
fn benchmark_command_parsing() {
    let lines = [
        "POST 10 20 yellow a message with several words",
        "GET color=blue contains=15 25 refersTo=several words",
        "GET PINS",
        "PIN 15 25",
        "UNPIN 15 25",
        "SHAKE",
        "CLEAR",
        "DISCONNECT",
    ];

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let command = Command::parse(lines[i % lines.len()]).unwrap();
        assert!(command.is_some());
    }

    let duration = start.elapsed();
    println!(
        "Command parsing: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks classification of response headers and payload lines
#[test]
fn benchmark_response_parsing() {
    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let _ = ResponseHeader::parse("OK 42").unwrap();
        let _ = ResponseHeader::parse("ERROR PIN_NOT_FOUND No pin at 1 2").unwrap();
        let _ = Note::parse_line("NOTE 10 20 yellow hello board", 100, 80).unwrap();
        let _ = "123 456".parse::<Pin>().unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Response parsing: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 1000);
}

/// Posting is a linear duplicate scan, so filling is quadratic overall
#[tokio::test]
async fn benchmark_board_fill() {
    let board = wide_board();
    let count = 2_000;

    let start = Instant::now();
    fill(&board, count).await;
    let duration = start.elapsed();

    println!("Board fill: {} notes in {:?}", count, duration);

    assert_eq!(board.note_count().await, count as usize);
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks filtered scans over a full board
#[tokio::test]
async fn benchmark_filtered_get() {
    let board = wide_board();
    fill(&board, 2_000).await;

    let filter = NoteFilter {
        color: Some("BLUE".to_string()),
        contains: Some((15, 15)),
        refers_to: Some("note".to_string()),
    };

    let iterations = 1_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let notes = board.get_notes(&filter).await;
        assert_eq!(notes.len(), 1);
    }

    let duration = start.elapsed();
    println!(
        "Filtered GET: {} scans in {:?} ({:.2} μs/scan)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}

/// Benchmarks SHAKE with half of the notes pinned
#[tokio::test]
async fn benchmark_shake() {
    let board = wide_board();
    fill(&board, 1_000).await;
    for i in (0..1_000i64).step_by(2) {
        board
            .add_pin(Pin::new((i % 100) * 10 + 1, (i / 100) * 10 + 1))
            .await
            .unwrap();
    }

    let start = Instant::now();
    let removed = board.remove_unpinned_notes().await;
    let duration = start.elapsed();

    println!("Shake: removed {} notes in {:?}", removed, duration);

    assert_eq!(removed, 500);
    assert_eq!(board.note_count().await, 500);
    assert!(duration.as_millis() < 1000);
}

/// Stress test: many tasks issuing full protocol lines against one board
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_test_concurrent_dispatch() {
    let board = Arc::new(wide_board());
    let tasks = 8;
    let per_task = 200;

    let start = Instant::now();
    let mut handles = Vec::new();
    for t in 0..tasks {
        let handler = ProtocolHandler::new(Arc::clone(&board));
        handles.push(tokio::spawn(async move {
            for i in 0..per_task {
                let line = format!("POST {} {} yellow task {}", i * 10, t * 10, t);
                let reply = handler.process_line(&line).await.unwrap();
                assert!(reply.response.is_ok());
                handler.process_line("GET contains=5 5").await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    let duration = start.elapsed();

    println!(
        "Concurrent dispatch: {} commands in {:?}",
        tasks * per_task * 2,
        duration
    );

    assert_eq!(board.note_count().await, tasks * per_task);
    assert!(duration.as_millis() < 5000);
}
