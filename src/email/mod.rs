//! Email dispatch: HTML templates and outbound transports.

pub mod dispatcher;
pub mod mailer;
pub mod templates;

pub use dispatcher::{EmailDispatcher, Recipients};
pub use mailer::{Attachment, HttpMailer, Mailer, OutgoingEmail, Sender, SmtpMailer};
pub use templates::{RenderedEmail, Template, TemplateFields};
