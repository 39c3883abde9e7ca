mod test_leave_resets_room;
mod test_rejoin_same_id;
mod test_third_peer_join_fanout;
