mod test_answer_and_ice_routed;
mod test_offer_routed_with_from_peer;
mod test_unknown_target_dropped;
