//! Integration tests for the multiplayer guessing game
//!
//! These tests validate cross-component interactions and real network behavior.

use bincode::{deserialize, serialize};
use server::catalog::PuzzleCatalog;
use server::leaderboard::LeaderboardCache;
use server::network::Server;
use server::score_store::ScoreStore;
use server::session::GameSession;
use shared::{
    Notice, Packet, PlayerAction, SessionView, CATEGORY_LIFE_LIMIT, PROTOCOL_VERSION,
    WORD_ATTEMPT_LIMIT,
};
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;
use tokio::time::sleep;

/// NETWORK PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    /// Tests packet serialization round-trip for network protocol validation
    #[tokio::test]
    async fn packet_serialization_roundtrip() {
        let test_packets = vec![
            Packet::Connect {
                client_version: PROTOCOL_VERSION,
                display_name: Some("Ada".to_string()),
            },
            Packet::Action {
                action: PlayerAction::Guess {
                    text: "inception".to_string(),
                },
            },
            Packet::Heartbeat { timestamp: 123456 },
            Packet::Disconnect,
            Packet::Connected {
                session_id: 42,
                identity: "Ada".to_string(),
            },
            Packet::Disconnected {
                reason: "Test".to_string(),
            },
        ];

        for packet in test_packets {
            let serialized = serialize(&packet).unwrap();
            let deserialized: Packet = deserialize(&serialized).unwrap();

            // Verify packet type matches (simplified check)
            match (&packet, &deserialized) {
                (Packet::Connect { .. }, Packet::Connect { .. }) => {}
                (Packet::Action { .. }, Packet::Action { .. }) => {}
                (Packet::Heartbeat { .. }, Packet::Heartbeat { .. }) => {}
                (Packet::Disconnect, Packet::Disconnect) => {}
                (Packet::Connected { .. }, Packet::Connected { .. }) => {}
                (Packet::Disconnected { .. }, Packet::Disconnected { .. }) => {}
                _ => panic!("Packet type mismatch after serialization"),
            }
        }
    }

    /// Tests view payloads survive serialization intact
    #[tokio::test]
    async fn view_serialization_roundtrip() {
        let packet = Packet::View {
            view: SessionView::Category {
                category: "movies".to_string(),
                clues: vec!["Dream heist thriller".to_string()],
                clues_total: 4,
                lives_left: 3,
                score: 5,
                notice: Some(Notice::Incorrect { lives_left: 3 }),
            },
        };

        let serialized = serialize(&packet).unwrap();
        let deserialized: Packet = deserialize(&serialized).unwrap();

        match deserialized {
            Packet::View {
                view:
                    SessionView::Category {
                        category,
                        clues,
                        lives_left,
                        notice,
                        ..
                    },
            } => {
                assert_eq!(category, "movies");
                assert_eq!(clues.len(), 1);
                assert_eq!(lives_left, 3);
                assert_eq!(notice, Some(Notice::Incorrect { lives_left: 3 }));
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    /// Tests real UDP socket communication
    #[tokio::test]
    async fn udp_socket_communication() {
        let server_socket =
            std::net::UdpSocket::bind("127.0.0.1:0").expect("Failed to bind server socket");
        let server_addr = server_socket.local_addr().unwrap();

        // Echo server
        let server_socket_clone = server_socket.try_clone().unwrap();
        thread::spawn(move || {
            let mut buf = [0; 1024];
            if let Ok((size, client_addr)) = server_socket_clone.recv_from(&mut buf) {
                let _ = server_socket_clone.send_to(&buf[..size], client_addr);
            }
        });

        sleep(Duration::from_millis(10)).await;

        let client_socket =
            std::net::UdpSocket::bind("127.0.0.1:0").expect("Failed to bind client socket");
        client_socket
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();

        let test_packet = Packet::Connect {
            client_version: PROTOCOL_VERSION,
            display_name: None,
        };
        let serialized = serialize(&test_packet).unwrap();

        client_socket.send_to(&serialized, server_addr).unwrap();

        let mut buf = [0; 1024];
        let (size, _) = client_socket.recv_from(&mut buf).unwrap();
        let received_packet: Packet = deserialize(&buf[..size]).unwrap();

        match received_packet {
            Packet::Connect { client_version, .. } => {
                assert_eq!(client_version, PROTOCOL_VERSION)
            }
            _ => panic!("Wrong packet type received"),
        }
    }
}

/// GAME SESSION INTEGRATION TESTS
mod game_session_tests {
    use super::*;

    /// Tests a category round from first clue to elimination and back home
    #[test]
    fn category_round_runs_to_elimination() {
        let catalog = test_catalog();
        let board = LeaderboardCache::new();
        let mut session = GameSession::new("Ada".to_string());

        let outcome = session.apply(
            PlayerAction::StartCategory {
                category: "movies".to_string(),
            },
            &catalog,
            &board,
        );
        match outcome.view {
            SessionView::Category {
                lives_left,
                ref clues,
                ..
            } => {
                assert_eq!(lives_left, CATEGORY_LIFE_LIMIT);
                assert_eq!(clues.len(), 1);
            }
            other => panic!("Expected category view, got {:?}", other),
        }

        // Burn every life
        for expected_left in (0..CATEGORY_LIFE_LIMIT).rev() {
            let outcome = session.apply(
                PlayerAction::Guess {
                    text: "wrong".to_string(),
                },
                &catalog,
                &board,
            );

            if expected_left == 0 {
                match outcome.view {
                    SessionView::Eliminated {
                        final_score,
                        answer,
                    } => {
                        assert_eq!(final_score, 0);
                        assert_eq!(answer, "Inception");
                    }
                    other => panic!("Expected elimination, got {:?}", other),
                }
                let scoring = outcome.scoring.expect("elimination reports the final score");
                assert_eq!(scoring.member, "Ada");
                assert_eq!(scoring.score, 0);
            } else {
                match outcome.view {
                    SessionView::Category { lives_left, .. } => {
                        assert_eq!(lives_left, expected_left)
                    }
                    other => panic!("Expected category view, got {:?}", other),
                }
                assert!(outcome.scoring.is_none());
            }
        }

        // Play again returns home with the score intact
        let outcome = session.apply(PlayerAction::PlayAgain, &catalog, &board);
        match outcome.view {
            SessionView::Home { score, .. } => assert_eq!(score, 0),
            other => panic!("Expected home view, got {:?}", other),
        }
    }

    /// Tests that a correct first-clue guess banks the full four points
    #[test]
    fn correct_guess_banks_points_and_serves_next() {
        let catalog = test_catalog();
        let board = LeaderboardCache::new();
        let mut session = GameSession::new("Ada".to_string());

        session.apply(
            PlayerAction::StartCategory {
                category: "movies".to_string(),
            },
            &catalog,
            &board,
        );
        let outcome = session.apply(
            PlayerAction::Guess {
                text: "inception".to_string(),
            },
            &catalog,
            &board,
        );

        let scoring = outcome.scoring.expect("a correct guess banks points");
        assert_eq!(scoring.member, "Ada");
        assert_eq!(scoring.score, 4);

        match outcome.view {
            SessionView::Category {
                ref clues,
                score,
                ref notice,
                ..
            } => {
                // A fresh puzzle starts over at one clue
                assert_eq!(clues.len(), 1);
                assert_eq!(score, 4);
                assert_eq!(
                    *notice,
                    Some(Notice::Correct {
                        answer: "Inception".to_string(),
                        points: 4,
                    })
                );
            }
            other => panic!("Expected category view, got {:?}", other),
        }
    }

    /// Tests the word round letter reveal and second-attempt scoring
    #[test]
    fn word_round_reveals_and_scores() {
        let catalog = test_catalog();
        let board = LeaderboardCache::new();
        let mut session = GameSession::new("Ada".to_string());

        let outcome = session.apply(PlayerAction::StartWord, &catalog, &board);
        let word = served_word(&outcome.view);
        match outcome.view {
            SessionView::Word {
                ref masked,
                attempt,
                ref definitions,
                ..
            } => {
                assert_eq!(attempt, 1);
                assert_eq!(definitions.len(), 1);
                assert!(masked.chars().all(|c| c == '_'));
            }
            other => panic!("Expected word view, got {:?}", other),
        }

        // A wrong guess reveals one letter and shows the second definition
        let outcome = session.apply(
            PlayerAction::Guess {
                text: "wrongword".to_string(),
            },
            &catalog,
            &board,
        );
        match outcome.view {
            SessionView::Word {
                ref masked,
                attempt,
                ref definitions,
                ref notice,
                ..
            } => {
                assert_eq!(attempt, 2);
                assert_eq!(definitions.len(), 2);
                assert_eq!(masked.chars().filter(|c| *c != '_').count(), 1);
                assert_eq!(
                    *notice,
                    Some(Notice::TryAgain {
                        attempts_left: WORD_ATTEMPT_LIMIT - 1
                    })
                );
            }
            other => panic!("Expected word view, got {:?}", other),
        }
        assert!(outcome.scoring.is_none());

        // Solving on the second attempt is worth two points
        let outcome = session.apply(
            PlayerAction::Guess {
                text: word.to_string(),
            },
            &catalog,
            &board,
        );
        let scoring = outcome.scoring.expect("a correct guess banks points");
        assert_eq!(scoring.score, 2);

        match outcome.view {
            SessionView::Word {
                ref masked,
                attempt,
                score,
                ..
            } => {
                // A fresh word starts fully hidden
                assert_eq!(attempt, 1);
                assert_eq!(score, 2);
                assert!(masked.chars().all(|c| c == '_'));
            }
            other => panic!("Expected word view, got {:?}", other),
        }
    }

    /// Tests that the leaderboard view reflects seeded standings
    #[test]
    fn leaderboard_view_reflects_cache() {
        let catalog = test_catalog();
        let board = LeaderboardCache::seeded(vec![
            shared::LeaderboardEntry {
                member: "Grace".to_string(),
                score: 9,
            },
            shared::LeaderboardEntry {
                member: "Ada".to_string(),
                score: 4,
            },
        ]);
        let mut session = GameSession::new("Ada".to_string());

        let outcome = session.apply(PlayerAction::OpenLeaderboard, &catalog, &board);
        match outcome.view {
            SessionView::Leaderboard { entries, score } => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].member, "Grace");
                assert_eq!(score, 0);
            }
            other => panic!("Expected leaderboard view, got {:?}", other),
        }
    }
}

/// CLIENT-SERVER INTEGRATION TESTS
mod client_server_tests {
    use super::*;

    /// Tests a full session over real UDP: connect, play, lose a life
    #[tokio::test]
    async fn full_session_over_udp() {
        let server_addr = start_test_server(8).await;
        let socket = connect_client(server_addr, "Ada").await;

        match recv_packet(&socket).await {
            Packet::Connected { identity, .. } => assert_eq!(identity, "Ada"),
            other => panic!("Expected Connected, got {:?}", other),
        }

        let categories = match expect_view(recv_packet(&socket).await) {
            SessionView::Home {
                categories, score, ..
            } => {
                assert_eq!(score, 0);
                categories
            }
            other => panic!("Expected home view, got {:?}", other),
        };
        assert_eq!(categories, vec!["movies".to_string()]);

        // Start the round and reveal a second clue
        send_action(
            &socket,
            server_addr,
            PlayerAction::StartCategory {
                category: "movies".to_string(),
            },
        )
        .await;
        match expect_view(recv_packet(&socket).await) {
            SessionView::Category {
                clues, lives_left, ..
            } => {
                assert_eq!(clues.len(), 1);
                assert_eq!(lives_left, CATEGORY_LIFE_LIMIT);
            }
            other => panic!("Expected category view, got {:?}", other),
        }

        send_action(&socket, server_addr, PlayerAction::RevealClue).await;
        match expect_view(recv_packet(&socket).await) {
            SessionView::Category { clues, .. } => assert_eq!(clues.len(), 2),
            other => panic!("Expected category view, got {:?}", other),
        }

        // A wrong guess costs a life
        send_action(
            &socket,
            server_addr,
            PlayerAction::Guess {
                text: "wrong".to_string(),
            },
        )
        .await;
        match expect_view(recv_packet(&socket).await) {
            SessionView::Category {
                lives_left, notice, ..
            } => {
                assert_eq!(lives_left, CATEGORY_LIFE_LIMIT - 1);
                assert_eq!(
                    notice,
                    Some(Notice::Incorrect {
                        lives_left: CATEGORY_LIFE_LIMIT - 1
                    })
                );
            }
            other => panic!("Expected category view, got {:?}", other),
        }

        let _ = socket
            .send_to(&serialize(&Packet::Disconnect).unwrap(), server_addr)
            .await;
    }

    /// Tests that one player's score shows up on another player's board
    #[tokio::test]
    async fn scores_reach_other_watchers() {
        let server_addr = start_test_server(8).await;

        let ada = connect_client(server_addr, "Ada").await;
        recv_packet(&ada).await; // Connected
        recv_packet(&ada).await; // Home view

        let grace = connect_client(server_addr, "Grace").await;
        recv_packet(&grace).await;
        recv_packet(&grace).await;

        // Grace opens the still-empty leaderboard
        send_action(&grace, server_addr, PlayerAction::OpenLeaderboard).await;
        match expect_view(recv_packet(&grace).await) {
            SessionView::Leaderboard { entries, .. } => assert!(entries.is_empty()),
            other => panic!("Expected leaderboard view, got {:?}", other),
        }

        // Ada solves a puzzle on the first clue
        send_action(
            &ada,
            server_addr,
            PlayerAction::StartCategory {
                category: "movies".to_string(),
            },
        )
        .await;
        recv_packet(&ada).await;
        send_action(
            &ada,
            server_addr,
            PlayerAction::Guess {
                text: "inception".to_string(),
            },
        )
        .await;
        match expect_view(recv_packet(&ada).await) {
            SessionView::Category { score, .. } => assert_eq!(score, 4),
            other => panic!("Expected category view, got {:?}", other),
        }

        // Grace's screen refreshes on the next sync
        match expect_view(recv_packet(&grace).await) {
            SessionView::Leaderboard { entries, score } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].member, "Ada");
                assert_eq!(entries[0].score, 4);
                assert_eq!(score, 0);
            }
            other => panic!("Expected refreshed leaderboard, got {:?}", other),
        }
    }

    /// Tests that journaled scores survive a server restart
    #[tokio::test]
    async fn scores_survive_restart_via_journal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.jsonl");

        // First server: Ada banks four points
        let store = ScoreStore::open(&path).await.unwrap();
        let addr = start_test_server_with_store(store, 8).await;

        let ada = connect_client(addr, "Ada").await;
        recv_packet(&ada).await;
        recv_packet(&ada).await;
        send_action(
            &ada,
            addr,
            PlayerAction::StartCategory {
                category: "movies".to_string(),
            },
        )
        .await;
        recv_packet(&ada).await;
        send_action(
            &ada,
            addr,
            PlayerAction::Guess {
                text: "inception".to_string(),
            },
        )
        .await;
        recv_packet(&ada).await;

        // Second server on the same journal starts with the standing
        let store = ScoreStore::open(&path).await.unwrap();
        let addr = start_test_server_with_store(store, 8).await;

        let grace = connect_client(addr, "Grace").await;
        recv_packet(&grace).await;
        recv_packet(&grace).await;
        send_action(&grace, addr, PlayerAction::OpenLeaderboard).await;
        match expect_view(recv_packet(&grace).await) {
            SessionView::Leaderboard { entries, .. } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].member, "Ada");
                assert_eq!(entries[0].score, 4);
            }
            other => panic!("Expected leaderboard view, got {:?}", other),
        }
    }

    /// Tests that a version-mismatched client is turned away
    #[tokio::test]
    async fn wrong_protocol_version_is_refused() {
        let server_addr = start_test_server(8).await;

        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let packet = Packet::Connect {
            client_version: PROTOCOL_VERSION + 1,
            display_name: None,
        };
        socket
            .send_to(&serialize(&packet).unwrap(), server_addr)
            .await
            .unwrap();

        match recv_packet(&socket).await {
            Packet::Disconnected { reason } => assert!(reason.contains("version")),
            other => panic!("Expected refusal, got {:?}", other),
        }
    }

    /// Tests the session capacity limit
    #[tokio::test]
    async fn server_full_refuses_connections() {
        let server_addr = start_test_server(1).await;

        let first = connect_client(server_addr, "Ada").await;
        match recv_packet(&first).await {
            Packet::Connected { .. } => {}
            other => panic!("Expected Connected, got {:?}", other),
        }
        recv_packet(&first).await; // Home view

        let second = connect_client(server_addr, "Grace").await;
        match recv_packet(&second).await {
            Packet::Disconnected { reason } => assert_eq!(reason, "Server full"),
            other => panic!("Expected refusal, got {:?}", other),
        }
    }

    /// Tests that actions without a session are rejected
    #[tokio::test]
    async fn action_without_session_is_rejected() {
        let server_addr = start_test_server(8).await;

        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        send_action(&socket, server_addr, PlayerAction::StartWord).await;

        match recv_packet(&socket).await {
            Packet::Disconnected { reason } => assert_eq!(reason, "No active session"),
            other => panic!("Expected refusal, got {:?}", other),
        }
    }
}

/// STRESS AND ERROR HANDLING TESTS
mod stress_tests {
    use super::*;

    /// Tests malformed packet handling
    #[test]
    fn malformed_packet_handling() {
        let valid_packet = Packet::Connect {
            client_version: PROTOCOL_VERSION,
            display_name: Some("Ada".to_string()),
        };
        let encoded = serialize(&valid_packet).unwrap();

        // Cut off mid-field
        let truncated = &encoded[..encoded.len() / 2];
        assert!(
            deserialize::<Packet>(truncated).is_err(),
            "Truncated bytes should not decode"
        );

        // Stomp the variant tag
        let mut corrupted = encoded.clone();
        corrupted[0] = 0xFF;
        assert!(
            deserialize::<Packet>(&corrupted).is_err(),
            "Corrupted bytes should not decode"
        );

        assert!(
            deserialize::<Packet>(&[]).is_err(),
            "Empty datagram should not decode"
        );
    }

    /// Tests that the server keeps serving after receiving garbage
    #[tokio::test]
    async fn server_survives_garbage_packets() {
        let server_addr = start_test_server(8).await;

        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.send_to(&[0xFF; 64], server_addr).await.unwrap();
        socket.send_to(&[], server_addr).await.unwrap();

        // A clean connect still works afterwards
        let packet = Packet::Connect {
            client_version: PROTOCOL_VERSION,
            display_name: Some("Ada".to_string()),
        };
        socket
            .send_to(&serialize(&packet).unwrap(), server_addr)
            .await
            .unwrap();

        match recv_packet(&socket).await {
            Packet::Connected { identity, .. } => assert_eq!(identity, "Ada"),
            other => panic!("Expected Connected, got {:?}", other),
        }
    }

    /// Tests that many clients connect with distinct session IDs
    #[tokio::test]
    async fn many_concurrent_sessions() {
        let server_addr = start_test_server(32).await;
        let mut ids = std::collections::HashSet::new();

        for i in 0..20 {
            let socket = connect_client(server_addr, &format!("Player{}", i)).await;
            match recv_packet(&socket).await {
                Packet::Connected { session_id, .. } => {
                    assert!(ids.insert(session_id), "Session IDs must be unique")
                }
                other => panic!("Expected Connected, got {:?}", other),
            }
        }
    }
}

// HELPER FUNCTIONS

const TEST_CONTENT: &str = r#"{
    "categories": {
        "movies": [
            {
                "answer": "Inception",
                "clues": [
                    "Dream heist thriller",
                    "A spinning top tests reality",
                    "Directed by Christopher Nolan",
                    "Released in 2010"
                ]
            }
        ]
    },
    "words": [
        { "word": "laconic", "definitions": ["Using few words", "Brief to the point of seeming rude"] },
        { "word": "candid", "definitions": ["Honest and direct", "Unposed, as a photograph"] }
    ]
}"#;

fn test_catalog() -> PuzzleCatalog {
    PuzzleCatalog::from_json(TEST_CONTENT).unwrap()
}

fn served_word(view: &SessionView) -> &'static str {
    match view {
        SessionView::Word { definitions, .. } => match definitions[0].as_str() {
            "Using few words" => "laconic",
            "Honest and direct" => "candid",
            other => panic!("Unknown word fixture: {}", other),
        },
        other => panic!("Expected word view, got {:?}", other),
    }
}

fn expect_view(packet: Packet) -> SessionView {
    match packet {
        Packet::View { view } => view,
        other => panic!("Expected view packet, got {:?}", other),
    }
}

async fn start_test_server(max_sessions: usize) -> SocketAddr {
    start_test_server_with_store(ScoreStore::in_memory(), max_sessions).await
}

async fn start_test_server_with_store(store: ScoreStore, max_sessions: usize) -> SocketAddr {
    let catalog = test_catalog();
    let server = Server::new(
        "127.0.0.1:0",
        catalog,
        store,
        Duration::from_millis(50),
        max_sessions,
    )
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();

    tokio::spawn(async move {
        let mut server = server;
        let _ = server.run().await;
    });

    addr
}

async fn connect_client(server_addr: SocketAddr, name: &str) -> tokio::net::UdpSocket {
    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let packet = Packet::Connect {
        client_version: PROTOCOL_VERSION,
        display_name: Some(name.to_string()),
    };
    socket
        .send_to(&serialize(&packet).unwrap(), server_addr)
        .await
        .unwrap();
    socket
}

async fn send_action(socket: &tokio::net::UdpSocket, server_addr: SocketAddr, action: PlayerAction) {
    let packet = Packet::Action { action };
    socket
        .send_to(&serialize(&packet).unwrap(), server_addr)
        .await
        .unwrap();
}

async fn recv_packet(socket: &tokio::net::UdpSocket) -> Packet {
    let mut buf = [0u8; 2048];
    let (len, _) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
        .await
        .expect("Timed out waiting for a server packet")
        .unwrap();
    deserialize(&buf[..len]).unwrap()
}
