//! Domain records mirrored between the chat platform and the record store.

mod channel;
mod contact;
mod ids;
mod ticket;

pub use channel::Channel;
pub use contact::{ChatIds, Contact, NewContact};
pub use ids::{ChannelId, ContactId, OperatorId, TicketId};
pub use ticket::{NewTicket, Ticket, TicketStatus};
