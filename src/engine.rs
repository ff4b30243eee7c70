/// Capability contract shared by every turn-based game engine: state access,
/// legal move listing, move application and per-seat views.
pub trait GameEngine {
    type State: Clone;
    type Action: Clone;
    type Error: std::error::Error;

    /// Full, unmasked state.
    fn get_state(&self) -> Result<Self::State, Self::Error>;

    /// Replace the authoritative state wholesale.
    fn set_state(&mut self, state: Self::State);

    fn get_list_action(&self) -> Result<Vec<Self::Action>, Self::Error>;

    /// Apply a chosen action; `None` is an explicit pass.
    fn apply_action(&mut self, action: Option<Self::Action>) -> Result<(), Self::Error>;

    fn get_player_view(&self, seat: usize) -> Result<Self::State, Self::Error>;
}
