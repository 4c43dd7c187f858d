use racebus::{
    Config,
    game::Phase,
    payload::{Frame, Payload},
    render::Exit,
    sim::{Network, Error},
    };
use Phase::*;


fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn network(nodes: u8) -> Network {
    Network::new(Config::new(nodes).unwrap())
}

fn readies(network: &Network) -> Vec<u8> {
    (0 .. network.len()).map(|i| network.ready(i).unwrap()).collect()
}

/// press a node and run the resulting rounds
fn broadcast(network: &mut Network, node: usize) {
    network.press(node).unwrap();
    network.settle().unwrap();
}

/// bring every node to the countdown, pressing in order
fn lobby_to_countdown(network: &mut Network) {
    for node in 0 .. network.len() {
        broadcast(network, node);
    }
    assert!(network.phases().iter().all(|&phase| phase == Countdown));
}

#[test]
fn three_nodes_get_ready() {
    init();
    let mut network = network(3);

    broadcast(&mut network, 0);
    assert_eq!(network.phases(), [Ready, Lobby, Lobby]);
    assert_eq!(readies(&network), [1, 1, 1]);

    broadcast(&mut network, 1);
    assert_eq!(network.phases(), [Ready, Ready, Lobby]);
    assert_eq!(readies(&network), [2, 2, 2]);

    broadcast(&mut network, 2);
    assert_eq!(network.phases(), [Countdown, Countdown, Countdown]);
    assert_eq!(readies(&network), [3, 3, 3]);

    assert_eq!(network.trace(), [
        Frame::broadcast(Payload::Ready(0)),
        Frame::broadcast(Payload::Ready(1)),
        Frame::broadcast(Payload::Ready(2)),
        ]);
}

#[test]
fn quorum_reached_once_without_skipping_ready() {
    init();
    let mut network = network(4);
    let mut history = vec![network.phases()];
    for node in [2, 0, 3, 1] {
        broadcast(&mut network, node);
        history.push(network.phases());
    }
    // every pressing node went through ready, except the last one which reached the quorum itself
    for (step, node) in [2, 0, 3].into_iter().enumerate() {
        assert_eq!(history[step + 1][node], Ready);
    }
    // the countdown is entered once, by everyone at the same round
    for node in 0 .. 4 {
        let entered = history.windows(2)
            .filter(|pair| pair[0][node] != Countdown && pair[1][node] == Countdown)
            .count();
        assert_eq!(entered, 1);
        assert_ne!(history[3][node], Countdown);
    }
    assert_eq!(readies(&network), [4, 4, 4, 4]);
}

#[test]
fn presses_out_of_turn_are_ignored() {
    init();
    let mut network = network(3);
    broadcast(&mut network, 0);
    // a ready node has nothing more to broadcast
    broadcast(&mut network, 0);
    assert_eq!(network.trace().len(), 1);
    assert_eq!(readies(&network), [1, 1, 1]);
}

#[test]
fn first_countdown_to_elapse_wins() {
    init();
    let mut network = network(3);
    lobby_to_countdown(&mut network);

    assert_eq!(network.finish_animation(0).unwrap(), Some(Exit::Play));
    assert_eq!(network.phases(), [Playing, Countdown, Countdown]);

    broadcast(&mut network, 0);
    assert_eq!(network.phases(), [Win, Lose, Lose]);
    assert_eq!(network.trace().last(), Some(&Frame::broadcast(Payload::Win)));

    // finales bring everybody back to the lobby
    for node in 0 .. 3 {
        assert_eq!(network.finish_animation(node).unwrap(), Some(Exit::Reset));
    }
    assert_eq!(network.phases(), [Lobby, Lobby, Lobby]);
    assert_eq!(readies(&network), [0, 0, 0]);
}

#[test]
fn pressing_during_countdown_loses() {
    init();
    let mut network = network(3);
    lobby_to_countdown(&mut network);
    broadcast(&mut network, 1);
    assert_eq!(network.phases(), [Win, Lose, Win]);
    assert_eq!(network.trace().last(), Some(&Frame::broadcast(Payload::Lose)));
    // the winner's finale brings it back to the lobby
    assert_eq!(network.finish_animation(0).unwrap(), Some(Exit::Reset));
    assert_eq!(network.phase(0).unwrap(), Lobby);
}

#[test]
fn mismatch_resets_everyone() {
    init();
    let mut network = network(3);
    broadcast(&mut network, 0);
    broadcast(&mut network, 1);

    // node 0 expects 2 but reads 5
    network.corrupt_next(0, 5).unwrap();
    network.press(2).unwrap();
    assert_eq!(network.phases(), [Ready, Ready, Lobby]);
    network.settle().unwrap();
    assert_eq!(network.phases(), [ReceiverError; 3]);

    let trace = network.trace();
    assert_eq!(trace.last(), Some(&Frame::broadcast(Payload::Error)));

    for node in 0 .. 3 {
        assert_eq!(network.finish_animation(node).unwrap(), Some(Exit::Reset));
    }
    assert_eq!(network.phases(), [Lobby; 3]);
    assert_eq!(readies(&network), [0, 0, 0]);

    // and the game starts over
    lobby_to_countdown(&mut network);
}

#[test]
fn corrupted_ready_count() {
    init();
    let mut network = network(3);
    broadcast(&mut network, 0);
    network.corrupt_next(1, 5).unwrap();
    broadcast(&mut network, 2);
    assert_eq!(network.phases(), [ReceiverError; 3]);
    assert_eq!(network.trace(), [
        Frame::broadcast(Payload::Ready(0)),
        Frame::broadcast(Payload::Ready(1)),
        Frame::broadcast(Payload::Error),
        ]);
}

#[test]
fn single_node_never_leaves_the_lobby() {
    init();
    let mut network = network(1);
    for _ in 0 .. 10 {
        network.press(0).unwrap();
        assert_eq!(network.settle(), Ok(1));
        assert_eq!(network.phase(0).unwrap(), Lobby);
        assert_eq!(network.ready(0).unwrap(), 0);
        assert!(! network.node(0).unwrap().game.busy());
    }
    assert!(network.trace().is_empty());
    assert_eq!(network.rounds(), 10);
}

#[test]
fn press_is_idempotent() {
    init();
    let mut network = network(3);
    network.press(1).unwrap();
    network.press(1).unwrap();
    network.press(1).unwrap();
    assert_eq!(network.node(1).unwrap().twi.start_requests(), 1);
    assert_eq!(network.settle(), Ok(1));
    assert_eq!(network.trace(), [Frame::broadcast(Payload::Ready(0))]);
    assert_eq!(readies(&network), [1, 1, 1]);
}

#[test]
fn one_broadcast_one_dispatch() {
    init();
    let mut network = network(2);
    broadcast(&mut network, 1);
    assert_eq!(network.trace().len(), 1);
    // the listener accounted the value exactly once
    assert_eq!(network.ready(0).unwrap(), 1);
    assert_eq!(network.phase(0).unwrap(), Lobby);
    assert_eq!(network.phase(1).unwrap(), Ready);
}

#[test]
fn simultaneous_race_results() {
    init();
    let mut network = network(3);
    lobby_to_countdown(&mut network);
    // both send the same LOSE byte, arbitration keeps both transmitters
    network.press(0).unwrap();
    network.press(1).unwrap();
    assert_eq!(network.settle(), Ok(1));
    assert_eq!(network.phases(), [Lose, Lose, Win]);
    assert_eq!(network.trace(), [
        Frame::broadcast(Payload::Ready(0)),
        Frame::broadcast(Payload::Ready(1)),
        Frame::broadcast(Payload::Ready(2)),
        Frame::broadcast(Payload::Lose),
        ]);
}

#[test]
fn lowest_byte_wins_arbitration() {
    init();
    let mut network = network(3);
    lobby_to_countdown(&mut network);
    network.finish_animation(0).unwrap();
    // WIN (0xfd) is lower than LOSE (0xfe)
    network.press(0).unwrap();
    network.press(1).unwrap();
    assert_eq!(network.settle(), Ok(1));
    assert_eq!(network.trace().last(), Some(&Frame::broadcast(Payload::Win)));
    // the node outbid on LOSE knows the only lower byte is WIN
    assert_eq!(network.phases(), [Win, Lose, Lose]);
    assert!(! network.node(1).unwrap().game.busy());

    // its finale resets it like everyone else, nobody wins twice
    for node in 0 .. 3 {
        assert_eq!(network.finish_animation(node).unwrap(), Some(Exit::Reset));
    }
    assert_eq!(network.phases(), [Lobby; 3]);
    assert_eq!(network.trace().iter().filter(|frame| frame.payload == Payload::Win).count(), 1);
    assert!(network.trace().iter().all(Frame::is_broadcast));
}

#[test]
fn status_query_has_no_effect() {
    init();
    let mut network = network(2);
    network.query(0).unwrap();
    assert_eq!(network.settle(), Ok(0));
    assert_eq!(network.phases(), [Lobby, Lobby]);
    assert!(network.trace().is_empty());
}

#[test]
fn leds_follow_the_phase() {
    init();
    let mut network = network(2);
    network.render(0).unwrap();
    let leds = network.node(0).unwrap().leds;
    assert_eq!(leds.color, racebus::render::Color::Red);
    assert_eq!(leds.bar, 0);

    broadcast(&mut network, 0);
    network.render(0).unwrap();
    let leds = network.node(0).unwrap().leds;
    assert_eq!(leds.color, racebus::render::Color::Green);
    assert_eq!(leds.bar, 0b0001);
}

#[test]
fn bad_indices() {
    let mut network = network(2);
    assert_eq!(network.press(2).err(), Some(Error::NoSuchNode {index: 2}));
    assert!(network.phase(5).is_err());
    assert_eq!(Network::with_nodes(0).err(), Some(Error::Config(racebus::Error::NoNodes)));
}
