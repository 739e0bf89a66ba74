use crate::events::EventRepository;
use crate::users::UserDirectory;

pub trait Store {
    type Events<'a>: EventRepository
    where
        Self: 'a;
    type Users<'a>: UserDirectory
    where
        Self: 'a;

    fn events(&self) -> Self::Events<'_>;
    fn users(&self) -> Self::Users<'_>;
}
