//! End-to-end sessions through the public API: config fixtures seed the
//! store, clients exchange JSON text with the context, and every seated
//! connection ends up with the same game.

use std::sync::Arc;

use chess_core::{Color, EndReason, Game, PieceKind, Position};
use game_server::{ws, Connection, GameStore, MemoryStore, ServerConfig, ServerContext, ServerMessage};
use tokio::sync::mpsc;

const CONFIG: &str = r#"
    [[users]]
    auth_token = "t-white"
    username = "wanda"

    [[users]]
    auth_token = "t-black"
    username = "boris"

    [[users]]
    auth_token = "t-fan"
    username = "fiona"

    [[games]]
    id = 10
    name = "club night"
    white = "wanda"
    black = "boris"
"#;

fn server() -> (Arc<ServerContext>, Arc<MemoryStore>) {
    let config = ServerConfig::from_toml_str(CONFIG).unwrap();
    let store = Arc::new(MemoryStore::new());
    config.seed(&store).unwrap();
    (Arc::new(ServerContext::with_memory_store(store.clone())), store)
}

fn command(kind: &str, token: &str, extra: &str) -> String {
    format!(r#"{{"type":"{kind}","authToken":"{token}","gameId":10{extra}}}"#)
}

fn move_text(text: &str) -> String {
    let square = |s: &str| {
        let pos: Position = s.parse().unwrap();
        format!(r#"{{"row":{},"column":{}}}"#, pos.row(), pos.column())
    };
    let promotion = match text.get(4..) {
        Some("q") => r#","promotion":"QUEEN""#,
        _ => "",
    };
    format!(
        r#","move":{{"start":{},"end":{}{promotion}}}"#,
        square(&text[0..2]),
        square(&text[2..4])
    )
}

fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

fn last_state(msgs: &[ServerMessage]) -> Option<Game> {
    msgs.iter().rev().find_map(|m| match m {
        ServerMessage::LoadGame { game } => Some(game.clone()),
        _ => None,
    })
}

#[tokio::test]
async fn test_full_game_stays_in_sync() {
    let (ctx, store) = server();
    let (white, mut white_rx) = Connection::channel(256);
    let (black, mut black_rx) = Connection::channel(256);
    let (fan, mut fan_rx) = Connection::channel(256);

    ctx.handle_text(&white, &command("JOIN_PLAYER", "t-white", r#","playerColor":"WHITE""#))
        .await;
    ctx.handle_text(&black, &command("JOIN_PLAYER", "t-black", r#","playerColor":"BLACK""#))
        .await;
    ctx.handle_text(&fan, &command("JOIN_OBSERVER", "t-fan", "")).await;
    assert_eq!(ctx.registry().session_count(10), 3);

    // en passant, castling and a capturing promotion
    let line = [
        "e2e4", "a7a6", "e4e5", "d7d5", "e5d6", "e8d7", "g1f3", "h7h6", "f1c4", "g7g5", "e1g1",
        "a6a5", "d6c7", "d8e8", "c7b8q",
    ];
    for (ply, text) in line.iter().enumerate() {
        let (conn, token) = if ply % 2 == 0 {
            (&white, "t-white")
        } else {
            (&black, "t-black")
        };
        ctx.handle_text(conn, &command("MAKE_MOVE", token, &move_text(text)))
            .await;
    }

    let white_msgs = drain(&mut white_rx);
    let black_msgs = drain(&mut black_rx);
    let fan_msgs = drain(&mut fan_rx);
    for msgs in [&white_msgs, &black_msgs, &fan_msgs] {
        assert!(
            !msgs.iter().any(|m| matches!(m, ServerMessage::Error { .. })),
            "unexpected error in {msgs:?}"
        );
    }

    let stored = store.find_game(10).unwrap().unwrap().game;
    assert_eq!(last_state(&white_msgs).as_ref(), Some(&stored));
    assert_eq!(last_state(&black_msgs).as_ref(), Some(&stored));
    assert_eq!(last_state(&fan_msgs).as_ref(), Some(&stored));

    let board = stored.board();
    let at = |s: &str| board.piece_at(s.parse().unwrap());
    assert_eq!(at("g1").map(|p| p.kind), Some(PieceKind::King));
    assert_eq!(at("f1").map(|p| p.kind), Some(PieceKind::Rook));
    assert_eq!(at("b8").map(|p| (p.color, p.kind)), Some((Color::White, PieceKind::Queen)));
    assert_eq!(at("d5"), None);
    assert_eq!(at("d6"), None);
    assert_eq!(at("e8").map(|p| p.kind), Some(PieceKind::Queen));
    assert!(!stored.castling_rights().white_king_side);
    assert_eq!(stored.turn(), Color::Black);
    assert!(stored.is_active());
}

#[tokio::test]
async fn test_fools_mate_ends_game_for_everyone() {
    let (ctx, store) = server();
    let (white, mut white_rx) = Connection::channel(64);
    let (black, mut black_rx) = Connection::channel(64);
    ctx.handle_text(&white, &command("JOIN_PLAYER", "t-white", r#","playerColor":"WHITE""#))
        .await;
    ctx.handle_text(&black, &command("JOIN_PLAYER", "t-black", r#","playerColor":"BLACK""#))
        .await;

    for (ply, text) in ["f2f3", "e7e5", "g2g4", "d8h4"].iter().enumerate() {
        let (conn, token) = if ply % 2 == 0 {
            (&white, "t-white")
        } else {
            (&black, "t-black")
        };
        ctx.handle_text(conn, &command("MAKE_MOVE", token, &move_text(text)))
            .await;
    }

    let white_msgs = drain(&mut white_rx);
    assert!(white_msgs.contains(&ServerMessage::notification(
        "boris makes move d8h4 Checkmate. boris wins!"
    )));
    drain(&mut black_rx);

    let game = store.find_game(10).unwrap().unwrap().game;
    assert_eq!(game.winner(), Some(Color::Black));
    assert!(matches!(
        game.status(),
        chess_core::GameStatus::Ended {
            reason: EndReason::Checkmate,
            ..
        }
    ));

    ctx.handle_text(&white, &command("RESIGN", "t-white", "")).await;
    assert_eq!(
        drain(&mut white_rx),
        vec![ServerMessage::error("Error: The game is already over")]
    );
}

#[tokio::test]
async fn test_closed_connection_is_dropped_from_fanout() {
    let (ctx, _store) = server();
    let (white, mut white_rx) = Connection::channel(16);
    let (fan, fan_rx) = Connection::channel(16);
    ctx.handle_text(&white, &command("JOIN_PLAYER", "t-white", r#","playerColor":"WHITE""#))
        .await;
    ctx.handle_text(&fan, &command("JOIN_OBSERVER", "t-fan", "")).await;
    drain(&mut white_rx);

    // observer's socket goes away without a LEAVE
    drop(fan_rx);
    ctx.handle_text(&white, &command("MAKE_MOVE", "t-white", &move_text("e2e4")))
        .await;
    assert_eq!(drain(&mut white_rx).len(), 1);

    assert_eq!(ctx.registry().remove_connection(fan.id()), vec![10]);
    assert_eq!(ctx.registry().session_count(10), 1);
}

#[test]
fn test_router_builds_from_config() {
    let (ctx, _store) = server();
    let config = ServerConfig::from_toml_str(r#"ws_path = "/play""#).unwrap();
    let _router = ws::router(ctx, &config);
}
