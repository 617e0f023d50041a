// Tests for the automation engine

#[cfg(test)]
mod test_accept_flow;


#[cfg(test)]
mod test_session_lifecycle;
