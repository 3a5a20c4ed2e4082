use halo_life::algs::communicator::{
    CommTag, Communicator, RayonComm, Wait, WaitBound, WaitFailure,
};
use halo_life::cancel::CancelToken;
use std::time::Duration;

fn recv_now(c: &RayonComm, peer: usize, tag: u16, len: usize) -> Result<Vec<u8>, WaitFailure> {
    let mut buf = vec![0u8; len];
    c.irecv(peer, tag, &mut buf)
        .wait_bounded(&WaitBound::new(Some(Duration::from_millis(10)), None))
}

#[test]
fn group_delivers_in_order_and_truncates() {
    let tag = CommTag::new(0x1000);
    let group = RayonComm::group(2);
    group[0].isend(1, tag.as_u16(), b"halo");
    for i in 0..4u8 {
        group[0].isend(1, tag.offset(1).as_u16(), &[i, i, i]);
    }
    assert_eq!(recv_now(&group[1], 0, tag.as_u16(), 4).unwrap(), b"halo");
    let rows: Vec<Vec<u8>> = (0..4)
        .map(|_| recv_now(&group[1], 0, tag.offset(1).as_u16(), 2).unwrap())
        .collect();
    assert_eq!(rows, vec![vec![0, 0], vec![1, 1], vec![2, 2], vec![3, 3]]);
    assert_eq!(group[0].pending(), 0);
}

#[test]
fn groups_do_not_share_messages() {
    let a = RayonComm::group(2);
    let b = RayonComm::group(2);
    a[0].isend(1, 7, &[1]);
    assert_eq!(recv_now(&b[1], 0, 7, 1), Err(WaitFailure::TimedOut));
    assert_eq!(recv_now(&a[1], 0, 7, 1).unwrap(), vec![1]);
}

#[test]
fn discarding_a_group_drops_only_its_messages() {
    let stale = RayonComm::group(3);
    let live = RayonComm::group(2);
    stale[0].isend(1, 3, &[9; 8]);
    stale[2].isend(0, 3, &[9; 8]);
    stale[2].isend(0, 3, &[9; 8]);
    live[1].isend(0, 3, &[5]);

    assert_eq!(stale[1].pending(), 3);
    assert_eq!(stale[1].discard_pending(), 3);
    assert_eq!(stale[0].pending(), 0);
    assert_eq!(recv_now(&stale[0], 2, 3, 8), Err(WaitFailure::TimedOut));
    assert_eq!(recv_now(&live[0], 1, 3, 1).unwrap(), vec![5]);
}

#[test]
fn ring_of_sendrecv_does_not_deadlock() {
    const P: usize = 5;
    let tag = CommTag::new(0x1003);
    let group = RayonComm::group(P);
    let got: Vec<Vec<u8>> = std::thread::scope(|s| {
        let handles: Vec<_> = group
            .iter()
            .map(|c| {
                s.spawn(move || {
                    let me = c.rank();
                    let mut buf = [0u8; 1];
                    c.sendrecv(
                        (me + 1) % P,
                        tag.as_u16(),
                        &[me as u8],
                        (me + P - 1) % P,
                        tag.as_u16(),
                        &mut buf,
                        &WaitBound::unbounded(),
                    )
                    .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for (me, msg) in got.iter().enumerate() {
        assert_eq!(msg, &vec![((me + P - 1) % P) as u8]);
    }
}

#[test]
fn bounded_wait_distinguishes_timeout_from_cancel() {
    let group = RayonComm::group(2);
    let mut buf = [0u8; 1];
    let timeout = WaitBound::new(Some(Duration::from_millis(10)), None);
    assert_eq!(
        group[0].irecv(1, 1, &mut buf).wait_bounded(&timeout),
        Err(WaitFailure::TimedOut)
    );

    let token = CancelToken::new();
    let cancel = WaitBound::new(Some(Duration::from_secs(60)), Some(&token));
    let waiter = std::thread::spawn({
        let c = group[0].clone();
        move || {
            let mut buf = [0u8; 1];
            c.irecv(1, 2, &mut buf).wait_bounded(&cancel)
        }
    });
    std::thread::sleep(Duration::from_millis(5));
    token.cancel();
    assert_eq!(waiter.join().unwrap(), Err(WaitFailure::Cancelled));
}
