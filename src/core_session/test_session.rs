// Session tests against a scripted server on in-memory pipes
