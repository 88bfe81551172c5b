mod support;
mod test_fsm;
mod test_handlers;
