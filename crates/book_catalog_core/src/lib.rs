pub mod domain;
pub mod ports;

pub use domain::{
    Book, BookRecommendation, NewBook, NewReadingList, NewReview, ReadingList, ReadingListUpdate,
    Review, Role, User,
};
pub use ports::{
    IdentityError, IdentityProvider, IdentityResult, IdentitySession, IdentityUser, Operation,
    PortError, PortResult, ResourceClient, SignInOutcome, SignUpRequest,
};
